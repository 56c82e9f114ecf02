use crate::generator::profile::SyntheticSolver;
use crate::workflow::commands::{load_script, CommandReplay};
use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use antcore::field::{wire_appearance, ElementAppearance, MeshBuilder, Renderable};
use antcore::geometry::Point;
use antcore::prelude::SolverRunner;
use antcore::scene::{derive_boom_geometry, field_center, BoomGeometry, Scene};
use antcore::solver::{ProcessRunner, SolveSummary, Solver};
use antcore::telemetry::{MetricsSnapshot, UserMessage};
use log::info;

#[derive(Debug)]
pub struct WorkflowResult {
    pub scene: Scene,
    pub solves: Vec<SolveSummary>,
    pub renderable: Renderable,
    pub wires: Vec<ElementAppearance>,
    pub boom: Option<BoomGeometry>,
    pub field_center: Point,
    pub metrics: MetricsSnapshot,
    pub messages: Vec<UserMessage>,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Runs with the solver the configuration asks for.
    pub fn execute(&self) -> anyhow::Result<WorkflowResult> {
        let runner: Box<dyn SolverRunner> = if self.config.synthetic {
            Box::new(SyntheticSolver::new(self.config.generator.clone()))
        } else {
            Box::new(ProcessRunner::from_config(&self.config.solver))
        };
        self.execute_with(runner)
    }

    /// Loads the antennas, replays the script, solves if anything is stale
    /// and builds the requested mesh.
    pub fn execute_with<R: SolverRunner>(&self, runner: R) -> anyhow::Result<WorkflowResult> {
        let config = &self.config;
        let mut scene = Scene::from_config(&config.visual);
        scene.mode = config.mode;
        let mut solver = Solver::new(runner, config.solver.clone(), config.visual.clone());

        for path in &config.antennas {
            scene
                .load_file(path)
                .with_context(|| format!("loading antenna {}", path.display()))?;
        }
        for standard in &config.standard {
            scene
                .load_standard(*standard)
                .with_context(|| format!("loading standard {}", standard.name()))?;
        }

        let mut solves = match &config.script {
            Some(path) => {
                let commands = load_script(path)?;
                info!("replaying {} commands from {}", commands.len(), path.display());
                CommandReplay::new(&mut scene, &mut solver)
                    .run(&commands)
                    .with_context(|| format!("replaying {}", path.display()))?
            }
            None => Vec::new(),
        };

        if let Some(summary) = solver
            .solve_if_needed(&mut scene)
            .context("solving the current antenna")?
        {
            solves.push(summary);
        }

        if let Some(path) = &config.save {
            scene
                .save(path, &config.visual)
                .with_context(|| format!("saving scene to {}", path.display()))?;
        }

        let builder = MeshBuilder::new(&config.visual);
        let (renderable, wires, boom) = match scene.current_antenna() {
            Ok(antenna) => (
                antenna
                    .field()
                    .map(|field| builder.build(field, config.display, config.channel))
                    .unwrap_or(Renderable::Empty),
                wire_appearance(antenna, config.wire_mode),
                derive_boom_geometry(antenna, &config.visual),
            ),
            Err(_) => (Renderable::Empty, Vec::new(), None),
        };
        let center = scene
            .current_index()
            .map(|current| field_center(scene.antennas(), current, &config.visual))
            .unwrap_or(Point::ORIGIN);

        Ok(WorkflowResult {
            solves,
            renderable,
            wires,
            boom,
            field_center: center,
            metrics: solver.metrics().snapshot(),
            messages: solver.messages().drain(),
            scene,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile::GeneratorConfig;
    use antcore::field::{Channel, DisplayMode};
    use antcore::prelude::{AntennaMode, SolverConfig};
    use antcore::scene::StandardAntenna;
    use std::fs;

    fn config_in(dir: &std::path::Path) -> WorkflowConfig {
        WorkflowConfig {
            solver: SolverConfig {
                working_dir: dir.to_path_buf(),
                ..Default::default()
            },
            standard: vec![StandardAntenna::Dipole],
            synthetic: true,
            display: DisplayMode::Surface,
            ..Default::default()
        }
    }

    #[test]
    fn runner_solves_and_meshes_a_standard_dipole() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Runner::new(config_in(dir.path()));
        let result = runner.execute().unwrap();

        assert_eq!(result.solves.len(), 1);
        assert_eq!(result.solves[0].samples, 72 * 72);
        assert_eq!(result.solves[0].segments, 21);
        assert_eq!(result.metrics.solves, 1);
        match &result.renderable {
            Renderable::Surface(mesh) => assert_eq!(mesh.dim(), (73, 73)),
            other => panic!("expected a surface, got {:?}", other),
        }
        assert!(result.boom.is_some());
        assert_eq!(result.wires.len(), 1);
        assert!(!result.messages.is_empty());
    }

    #[test]
    fn runner_replays_script_before_final_solve() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("edit.txt");
        let saved = dir.path().join("saved.nec");
        fs::write(
            &script,
            format!(
                "standard yagi\nmove-antenna 4 0 0\nmode multiple\nwall\nscale-wall 0 1 0\nsolve\nsave {}\n",
                saved.display()
            ),
        )
        .unwrap();

        let mut config = config_in(dir.path());
        config.script = Some(script);
        config.channel = Channel::Nulls;
        config.generator = GeneratorConfig {
            seed: 3,
            ..Default::default()
        };
        let result = Runner::new(config).execute().unwrap();

        // The script's solve leaves nothing stale for the final check.
        assert_eq!(result.solves.len(), 1);
        assert_eq!(result.solves[0].segments, 21 + 63 + 120);
        assert_eq!(result.scene.len(), 2);
        assert_eq!(result.scene.mode, AntennaMode::Multiple);
        assert!(result.scene.antennas()[0].elements()[0]
            .as_wire()
            .unwrap()
            .has_currents());
        assert_eq!(result.field_center.x, 2.0);

        let deck = fs::read_to_string(saved).unwrap();
        assert_eq!(deck.lines().filter(|l| l.starts_with("GW")).count(), 1 + 3 + 24);
    }

    #[test]
    fn runner_reports_missing_antenna_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.antennas = vec![dir.path().join("absent.nec")];
        let err = Runner::new(config).execute().unwrap_err();
        assert!(format!("{:#}", err).contains("loading antenna"));
    }
}
