//! Turns a sampled radiation pattern into renderable geometry.
//!
//! Points mode yields one sprite per sample. Surface and sphere modes lay the
//! samples on an `increments x increments` grid and close it into an
//! `(increments + 1) x (increments + 1)` mesh whose last row and column
//! repeat row 0 and column 0, so the polar and azimuthal seams meet.

use crate::field::color::{color_for, Rgba};
use crate::field::data::{FieldData, FieldRanges, FieldSample, PolarizationSense};
use crate::geometry::point::Point;
use crate::prelude::VisualConfig;
use log::{debug, warn};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

const GAIN_COLOR: Rgba = Rgba::new(0.1, 0.8, 0.1, 1.0);
const LINEAR_COLOR: Rgba = Rgba::opaque(0.0, 1.0, 0.0);
const RIGHT_COLOR: Rgba = Rgba::opaque(1.0, 1.0, 1.0);
const LEFT_COLOR: Rgba = Rgba::opaque(0.0, 0.0, 1.0);
const NULL_COLOR: Rgba = Rgba::opaque(1.0, 0.0, 0.0);

/// Points mode lifts nulls by this fraction of the configured null distance.
const POINT_NULL_LIFT: f64 = 0.2;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Points,
    Surface,
    Sphere,
}

/// Scalar channel that drives the colors.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    #[default]
    Gain,
    PolarizationSense,
    PolarizationTilt,
    AxialRatio,
    Nulls,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MeshPoint {
    pub position: Point,
    pub color: Rgba,
}

/// A point-cloud sample drawn as a cube of edge `size`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointSprite {
    pub position: Point,
    pub size: f64,
    pub color: Rgba,
}

/// Closed sphere-topology grid of mesh points.
#[derive(Debug, Clone)]
pub struct SurfaceMesh {
    increments: usize,
    full_longitude: bool,
    grid: Array2<MeshPoint>,
}

impl SurfaceMesh {
    pub fn increments(&self) -> usize {
        self.increments
    }

    /// Rows and columns of the closed grid, `increments + 1` each.
    pub fn dim(&self) -> (usize, usize) {
        self.grid.dim()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&MeshPoint> {
        self.grid.get((row, col))
    }

    /// Highest longitude index a strip reaches.
    pub fn strip_extent(&self) -> usize {
        if self.full_longitude {
            self.increments
        } else {
            self.increments / 2
        }
    }

    /// One triangle strip per latitude band. Each strip alternates the
    /// vertex on the band's row with the one on the next row.
    pub fn strips(&self) -> Vec<Vec<MeshPoint>> {
        let extent = self.strip_extent();
        (0..self.increments)
            .map(|lat| {
                (0..=extent)
                    .flat_map(|lon| [self.grid[(lat, lon)], self.grid[(lat + 1, lon)]])
                    .collect()
            })
            .collect()
    }

    pub fn vertex_count(&self) -> usize {
        self.increments * (self.strip_extent() + 1) * 2
    }
}

/// Output of a mesh build.
#[derive(Debug, Clone)]
pub enum Renderable {
    Points(Vec<PointSprite>),
    Surface(SurfaceMesh),
    Empty,
}

impl Renderable {
    pub fn is_empty(&self) -> bool {
        match self {
            Renderable::Points(points) => points.is_empty(),
            Renderable::Surface(_) => false,
            Renderable::Empty => true,
        }
    }
}

/// Builds point clouds and closed meshes from field data.
pub struct MeshBuilder<'a> {
    config: &'a VisualConfig,
}

impl<'a> MeshBuilder<'a> {
    pub fn new(config: &'a VisualConfig) -> Self {
        Self { config }
    }

    pub fn build(&self, field: &FieldData, mode: DisplayMode, channel: Channel) -> Renderable {
        match mode {
            DisplayMode::Points => Renderable::Points(self.points(field, channel)),
            DisplayMode::Surface | DisplayMode::Sphere => self
                .surface(field, mode, channel)
                .map(Renderable::Surface)
                .unwrap_or(Renderable::Empty),
        }
    }

    /// One sprite per sample. Nulls that are not below the threshold are
    /// left out.
    pub fn points(&self, field: &FieldData, channel: Channel) -> Vec<PointSprite> {
        let Some(ranges) = field.ranges() else {
            return Vec::new();
        };

        field
            .samples()
            .iter()
            .filter_map(|sample| {
                let color = self.channel_color(sample, ranges, channel);
                let mut distance = (sample.total_gain / 10.0).exp();
                if channel == Channel::Nulls {
                    if color.a <= 0.0 {
                        return None;
                    }
                    distance += self.config.null_distance * POINT_NULL_LIFT;
                }
                Some(PointSprite {
                    position: direction(sample, distance * self.config.point_distance_scale),
                    size: distance * self.config.point_size_scale,
                    color,
                })
            })
            .collect()
    }

    /// Closed grid for surface or sphere modes; `None` when the field holds
    /// too few samples for the configured step size.
    pub fn surface(
        &self,
        field: &FieldData,
        mode: DisplayMode,
        channel: Channel,
    ) -> Option<SurfaceMesh> {
        let ranges = field.ranges()?;
        let increments = grid_increments(field.step_size);
        if increments == 0 {
            warn!("step size {} leaves no mesh increments", field.step_size);
            return None;
        }
        if field.len() < increments * increments {
            warn!(
                "field has {} samples, mesh needs {}",
                field.len(),
                increments * increments
            );
            return None;
        }

        let mut grid = Array2::<MeshPoint>::default((increments + 1, increments + 1));
        let mut samples = field.samples().iter();
        for el in 0..increments {
            for az in 0..increments {
                // Length was checked above.
                let sample = samples.next()?;
                grid[(el, az)] = MeshPoint {
                    position: direction(sample, self.radius(sample, mode, channel)),
                    color: self.channel_color(sample, ranges, channel),
                };
            }
        }

        for el in 0..increments {
            grid[(el, increments)] = grid[(el, 0)];
        }
        for az in 0..=increments {
            grid[(increments, az)] = grid[(0, az)];
        }

        debug!(
            "built {:?} mesh with {} increments for {:?}",
            mode, increments, channel
        );
        Some(SurfaceMesh {
            increments,
            full_longitude: self.config.full_longitude_strips,
            grid,
        })
    }

    fn radius(&self, sample: &FieldSample, mode: DisplayMode, channel: Channel) -> f64 {
        let base = match mode {
            DisplayMode::Sphere => self.config.point_distance_scale,
            _ => (sample.total_gain / 10.0).exp() * self.config.point_distance_scale,
        };
        if channel == Channel::Nulls {
            base + self.config.null_distance
        } else {
            base
        }
    }

    fn channel_color(&self, sample: &FieldSample, ranges: &FieldRanges, channel: Channel) -> Rgba {
        let alpha = self.config.alpha;
        match channel {
            Channel::Gain => GAIN_COLOR.with_alpha(alpha),
            Channel::PolarizationSense => match sample.sense {
                PolarizationSense::Linear => LINEAR_COLOR,
                PolarizationSense::Right => RIGHT_COLOR,
                PolarizationSense::Left => LEFT_COLOR,
            }
            .with_alpha(alpha),
            Channel::PolarizationTilt => {
                let t = ranges.tilt.normalize(sample.tilt) as f32;
                Rgba::new(1.0 - t, t, 0.0, alpha)
            }
            Channel::AxialRatio => color_for(
                sample.axial_ratio,
                ranges.axial_ratio.min,
                ranges.axial_ratio.max,
            )
            .with_alpha(alpha),
            Channel::Nulls => {
                if ranges.gain.normalize(sample.total_gain) < self.config.null_threshold {
                    NULL_COLOR.with_alpha(alpha)
                } else {
                    Rgba::TRANSPARENT
                }
            }
        }
    }
}

/// Mesh increments per axis; fractional step sizes truncate.
pub fn grid_increments(step_size: f64) -> usize {
    if step_size <= 0.0 {
        return 0;
    }
    (360.0 / step_size) as usize
}

/// Position `distance` away from the origin along the sample's direction.
fn direction(sample: &FieldSample, distance: f64) -> Point {
    let theta = sample.theta.to_radians();
    let phi = sample.phi.to_radians();
    Point::new(
        theta.sin() * phi.cos() * distance,
        theta.cos() * phi.cos() * distance,
        phi.sin() * distance,
    )
}
