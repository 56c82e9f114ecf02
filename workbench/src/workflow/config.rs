use crate::generator::profile::GeneratorConfig;
use antcore::field::{Channel, DisplayMode, WireDrawMode};
use antcore::prelude::{AntennaMode, SolverConfig, VisualConfig};
use antcore::scene::StandardAntenna;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub visual: VisualConfig,
    pub solver: SolverConfig,
    /// Solver description files loaded in order.
    pub antennas: Vec<PathBuf>,
    /// Built-in antennas loaded after the files.
    pub standard: Vec<StandardAntenna>,
    pub mode: AntennaMode,
    pub display: DisplayMode,
    pub channel: Channel,
    pub wire_mode: WireDrawMode,
    /// Command script replayed against the scene after loading.
    pub script: Option<PathBuf>,
    /// Use the built-in generator instead of the external solver.
    pub synthetic: bool,
    pub generator: GeneratorConfig,
    pub report: Option<PathBuf>,
    /// Where to write the final scene as a solver description.
    pub save: Option<PathBuf>,
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(antennas: Vec<PathBuf>, synthetic: bool) -> Self {
        Self {
            antennas,
            synthetic,
            ..Default::default()
        }
    }

    /// Number of antennas the workflow loads before any script runs.
    pub fn initial_antennas(&self) -> usize {
        self.antennas.len() + self.standard.len()
    }
}
