//! Built-in descriptions loadable without a file.

use serde::{Deserialize, Serialize};

const DIPOLE: &str = "\
CM DIPOLE half wave for 14.2 MHz
CE
GW 1 21 0 -528 1000 0 528 1000 0.5
GE 1
GN 1
EX 0 1 11 0 1.0 0.0
FR 0 1 0 0 14.2 0
RP 0 73 73 1001 0 0 5 5 0 0
EN
";

const YAGI: &str = "\
CM YAGI three element for 14.2 MHz
CM reflector, driven element, director
CE
GW 1 21 -420 -535 1000 -420 535 1000 0.5
GW 2 21 0 -510 1000 0 510 1000 0.5
GW 3 21 380 -480 1000 380 480 1000 0.5
GE 1
GN 1
EX 0 2 11 0 1.0 0.0
FR 0 1 0 0 14.2 0
RP 0 73 73 1001 0 0 5 5 0 0
EN
";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StandardAntenna {
    Dipole,
    Yagi,
}

impl StandardAntenna {
    pub fn name(&self) -> &'static str {
        match self {
            StandardAntenna::Dipole => "dipole",
            StandardAntenna::Yagi => "yagi",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            StandardAntenna::Dipole => DIPOLE,
            StandardAntenna::Yagi => YAGI,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "dipole" => Some(StandardAntenna::Dipole),
            "yagi" => Some(StandardAntenna::Yagi),
            _ => None,
        }
    }
}
