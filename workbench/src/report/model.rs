use crate::workflow::runner::WorkflowResult;
use antcore::field::{Channel, DisplayMode, Renderable, ScalarRange, WireDrawMode};
use antcore::geometry::Point;
use antcore::prelude::AntennaMode;
use antcore::scene::BoomGeometry;
use antcore::solver::SolveSummary;
use antcore::telemetry::{MetricsSnapshot, UserMessage};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AntennaReport {
    pub name: String,
    pub kind: String,
    pub elements: usize,
    pub segments: usize,
    pub frequency: f64,
    pub offset: Point,
    pub visual_scale: f64,
    pub field_computed: bool,
    /// Largest segment current magnitude, once currents are known.
    pub peak_current: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldReport {
    pub samples: usize,
    pub step_size: f64,
    pub gain: ScalarRange,
    pub tilt: ScalarRange,
    pub axial_ratio: ScalarRange,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct MeshReport {
    pub display: DisplayMode,
    pub channel: Channel,
    pub points: usize,
    pub strips: usize,
    pub vertices: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VisualizationModel {
    pub mode: AntennaMode,
    pub current: Option<usize>,
    pub antennas: Vec<AntennaReport>,
    pub field: Option<FieldReport>,
    pub field_center: Point,
    pub boom: Option<BoomGeometry>,
    pub mesh: MeshReport,
    pub wire_mode: WireDrawMode,
    /// Segments colored by current under `wire_mode`.
    pub colored_segments: usize,
    pub solves: Vec<SolveSummary>,
    pub metrics: MetricsSnapshot,
    pub messages: Vec<UserMessage>,
}

impl VisualizationModel {
    pub fn from_result(
        result: &WorkflowResult,
        display: DisplayMode,
        channel: Channel,
        wire_mode: WireDrawMode,
    ) -> Self {
        let scene = &result.scene;
        let antennas = scene
            .antennas()
            .iter()
            .map(|antenna| AntennaReport {
                name: antenna.name.clone(),
                kind: antenna.kind.label().to_string(),
                elements: antenna.element_count(),
                segments: antenna.total_segments(),
                frequency: antenna.frequency,
                offset: antenna.offset,
                visual_scale: antenna.visual_scale(),
                field_computed: antenna.field_computed(),
                peak_current: antenna.current_ranges().map(|r| r.magnitude.max),
            })
            .collect();

        let field = scene
            .current_antenna()
            .ok()
            .and_then(|antenna| antenna.field())
            .and_then(|field| {
                field.ranges().map(|ranges| FieldReport {
                    samples: field.len(),
                    step_size: field.step_size,
                    gain: ranges.gain,
                    tilt: ranges.tilt,
                    axial_ratio: ranges.axial_ratio,
                })
            });

        let mut mesh = MeshReport {
            display,
            channel,
            ..Default::default()
        };
        match &result.renderable {
            Renderable::Points(points) => mesh.points = points.len(),
            Renderable::Surface(surface) => {
                mesh.strips = surface.increments();
                mesh.vertices = surface.vertex_count();
            }
            Renderable::Empty => {}
        }

        Self {
            mode: scene.mode,
            current: scene.current_index(),
            antennas,
            field,
            field_center: result.field_center,
            boom: result.boom,
            mesh,
            wire_mode,
            colored_segments: result.wires.iter().map(|w| w.segment_colors.len()).sum(),
            solves: result.solves.clone(),
            metrics: result.metrics,
            messages: result.messages.clone(),
        }
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::config::WorkflowConfig;
    use crate::workflow::runner::Runner;
    use antcore::prelude::SolverConfig;
    use antcore::scene::StandardAntenna;

    #[test]
    fn model_summarizes_a_solved_yagi() {
        let dir = tempfile::tempdir().unwrap();
        let config = WorkflowConfig {
            solver: SolverConfig {
                working_dir: dir.path().to_path_buf(),
                ..Default::default()
            },
            standard: vec![StandardAntenna::Yagi],
            synthetic: true,
            display: DisplayMode::Sphere,
            wire_mode: WireDrawMode::CurrentPhase,
            ..Default::default()
        };
        let result = Runner::new(config.clone()).execute().unwrap();
        let model =
            VisualizationModel::from_result(&result, config.display, config.channel, config.wire_mode);

        assert_eq!(model.current, Some(0));
        assert_eq!(model.antennas.len(), 1);
        assert_eq!(model.antennas[0].segments, 63);
        assert!(model.antennas[0].peak_current.unwrap() > 0.0);
        assert_eq!(model.field.as_ref().unwrap().samples, 72 * 72);
        assert_eq!(model.mesh.strips, 72);
        assert_eq!(model.mesh.vertices, 72 * 37 * 2);
        assert_eq!(model.colored_segments, 63);

        let json = model.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["mode"], "single");
        assert_eq!(value["mesh"]["display"], "sphere");
        assert_eq!(value["wire_mode"], "current_phase");
    }

    #[test]
    fn empty_result_serializes() {
        let model = VisualizationModel::default();
        let json = model.to_json().unwrap();
        assert!(json.contains("\"antennas\": []"));
    }
}
