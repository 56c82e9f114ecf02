//! Support structure inferred from wire extents. Pure over the geometry.

use crate::geometry::antenna::{Antenna, AntennaType};
use crate::geometry::point::Point;
use crate::prelude::VisualConfig;
use serde::{Deserialize, Serialize};

/// Boom and mast placement for drawing an antenna's support.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoomGeometry {
    /// Extent of the wires along x.
    pub length: f64,
    /// Mean wire radius.
    pub width: f64,
    /// Smallest x over the wires.
    pub shift: f64,
    /// x coordinate of the boom's midpoint.
    pub center: f64,
    /// Height of the boom above ground.
    pub height: f64,
    pub has_mast: bool,
    pub has_boom: bool,
}

struct Extent {
    min: f64,
    max: f64,
}

fn extent(values: impl Iterator<Item = f64>) -> Option<Extent> {
    values.fold(None, |acc, v| match acc {
        None => Some(Extent { min: v, max: v }),
        Some(e) => Some(Extent {
            min: e.min.min(v),
            max: e.max.max(v),
        }),
    })
}

/// Boom height of `antenna`, before any ground offset is applied.
pub fn boom_height(antenna: &Antenna, config: &VisualConfig) -> f64 {
    let z = extent(antenna.wires().flat_map(|(_, w)| [w.e1.z, w.e2.z]));
    let measured = match (antenna.kind, z) {
        (AntennaType::Yagi | AntennaType::Quad | AntennaType::Dipole, Some(z)) => {
            (z.max + z.min) / 2.0
        }
        (AntennaType::ElevatedVertical, Some(z)) => z.min,
        _ => 0.0,
    };

    if antenna.ground_specified {
        measured / config.scale_factor
    } else if antenna.kind.is_elevated() {
        config.default_boom_height / config.scale_factor
    } else {
        0.0
    }
}

/// Derives the boom from the wire endpoints; `None` for an antenna without
/// wires.
pub fn derive_boom_geometry(antenna: &Antenna, config: &VisualConfig) -> Option<BoomGeometry> {
    let x = extent(antenna.wires().flat_map(|(_, w)| [w.e1.x, w.e2.x]))?;
    let (count, radius_sum) = antenna
        .wires()
        .fold((0usize, 0.0), |(n, sum), (_, w)| (n + 1, sum + w.radius));

    let length = (x.max - x.min) / config.scale_factor;
    let shift = x.min / config.scale_factor;
    Some(BoomGeometry {
        length,
        width: radius_sum / count as f64,
        shift,
        center: length / 2.0 + shift,
        height: boom_height(antenna, config),
        has_mast: antenna.kind.is_elevated(),
        has_boom: antenna.kind.has_boom(),
    })
}

/// Where the field of a multi-antenna solve is drawn: the mean of all
/// offsets, lifted by the current antenna's boom height along y.
pub fn field_center(antennas: &[Antenna], current: usize, config: &VisualConfig) -> Point {
    if antennas.is_empty() {
        return Point::ORIGIN;
    }
    let sum = antennas
        .iter()
        .fold(Point::ORIGIN, |acc, antenna| acc + antenna.offset);
    let mean = sum.scaled(1.0 / antennas.len() as f64);
    let lift = antennas
        .get(current)
        .map(|antenna| boom_height(antenna, config))
        .unwrap_or(0.0);
    mean.translated(0.0, lift, 0.0)
}
