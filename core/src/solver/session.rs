use crate::prelude::{
    AntennaError, AntennaMode, AntennaResult, SolverConfig, SolverRunner, VisualConfig,
};
use crate::scene::Scene;
use crate::solver::output::{assign_currents, parse_currents, parse_pattern};
use crate::solver::writer::{write_combined, write_single, SolverDeck};
use crate::telemetry::{MessageLog, SolveMetrics};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

/// Progress of one solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SolveState {
    Idle,
    Serializing,
    Invoking,
    ParsingPattern,
    ParsingCurrents,
    Done,
    Failed,
}

impl SolveState {
    pub fn in_flight(&self) -> bool {
        !matches!(self, SolveState::Idle | SolveState::Done | SolveState::Failed)
    }
}

/// What a completed solve produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveSummary {
    pub antenna: usize,
    pub samples: usize,
    pub segments: usize,
    pub anomalies: usize,
}

/// Drives serialize, invoke and parse for the current antenna of a scene.
pub struct Solver<R: SolverRunner> {
    runner: R,
    config: SolverConfig,
    visual: VisualConfig,
    state: SolveState,
    metrics: Arc<SolveMetrics>,
    messages: Arc<MessageLog>,
}

impl<R: SolverRunner> Solver<R> {
    pub fn new(runner: R, config: SolverConfig, visual: VisualConfig) -> Self {
        Self {
            runner,
            config,
            visual,
            state: SolveState::Idle,
            metrics: Arc::new(SolveMetrics::new()),
            messages: Arc::new(MessageLog::new()),
        }
    }

    /// Shares an existing message channel instead of a private one.
    pub fn with_messages(mut self, messages: Arc<MessageLog>) -> Self {
        self.messages = messages;
        self
    }

    pub fn state(&self) -> SolveState {
        self.state
    }

    pub fn metrics(&self) -> &SolveMetrics {
        &self.metrics
    }

    pub fn messages(&self) -> Arc<MessageLog> {
        Arc::clone(&self.messages)
    }

    pub fn visual(&self) -> &VisualConfig {
        &self.visual
    }

    /// Solves only when the scene changed since the last solve.
    pub fn solve_if_needed(&mut self, scene: &mut Scene) -> AntennaResult<Option<SolveSummary>> {
        if !scene.needs_solve() {
            debug!("field is current, solve skipped");
            return Ok(None);
        }
        self.solve(scene).map(Some)
    }

    /// Runs one full solve. On failure the state becomes `Failed`, the
    /// message channel gets the error and the scene keeps its previous
    /// field and currents.
    pub fn solve(&mut self, scene: &mut Scene) -> AntennaResult<SolveSummary> {
        if self.state.in_flight() {
            return Err(AntennaError::SolveInProgress);
        }
        match self.run_stages(scene) {
            Ok(summary) => {
                self.state = SolveState::Done;
                self.metrics.record_solve();
                self.messages.info(format!(
                    "field computation complete: {} samples, {} segments",
                    summary.samples, summary.segments
                ));
                Ok(summary)
            }
            Err(err) => {
                self.state = SolveState::Failed;
                self.metrics.record_failure();
                self.messages.error(format!("solve failed: {}", err));
                Err(err)
            }
        }
    }

    fn run_stages(&mut self, scene: &mut Scene) -> AntennaResult<SolveSummary> {
        self.state = SolveState::Serializing;
        let current = scene.current_index().ok_or(AntennaError::NoCurrentAntenna)?;
        let deck = self.compose(scene, current);
        let input = self.config.input_path();
        let output = self.config.output_path();
        remove_stale(&input)?;
        remove_stale(&output)?;
        fs::write(&input, &deck.text).map_err(|e| AntennaError::io(&input, e))?;

        self.state = SolveState::Invoking;
        self.messages.info("running solver, please stand by");
        self.runner.run(&input, &output)?;
        let text = fs::read_to_string(&output).map_err(|e| AntennaError::io(&output, e))?;

        // Both sections are read before anything in the scene changes.
        self.state = SolveState::ParsingPattern;
        let pattern = parse_pattern(&text, self.visual.step_size)?;
        self.state = SolveState::ParsingCurrents;
        let currents = parse_currents(&text, deck.layout.total_segments())?;

        let mut anomalies = pattern.anomalies + currents.anomalies;
        anomalies += assign_currents(&currents.records, &deck.layout, scene.antennas_mut());
        self.metrics.record_anomalies(anomalies);
        if anomalies > 0 {
            self.messages
                .warn(format!("{} malformed fields in solver output read as zero", anomalies));
        }

        let samples = pattern.field.len();
        let stamp = scene.solve_stamp().ok_or(AntennaError::NoCurrentAntenna)?;
        scene.antennas_mut()[current].set_field(pattern.field, stamp);
        info!("antenna {} solved with {} pattern samples", current, samples);

        Ok(SolveSummary {
            antenna: current,
            samples,
            segments: currents.records.len(),
            anomalies,
        })
    }

    fn compose(&self, scene: &Scene, current: usize) -> SolverDeck {
        match scene.mode {
            AntennaMode::Single => {
                write_single(&scene.antennas()[current], current, &self.visual)
            }
            AntennaMode::Multiple => write_combined(scene.antennas(), current, &self.visual),
        }
    }
}

fn remove_stale(path: &Path) -> AntennaResult<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(AntennaError::io(path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    struct FailingRunner;

    impl SolverRunner for FailingRunner {
        fn run(&mut self, _input: &Path, _output: &Path) -> AntennaResult<()> {
            Err(AntennaError::SolverExit("exit status: 1".into()))
        }
    }

    struct TruncatedRunner;

    impl SolverRunner for TruncatedRunner {
        fn run(&mut self, _input: &Path, output: &Path) -> AntennaResult<()> {
            fs::write(output, "CURRENTS AND LOCATION\n").map_err(|e| AntennaError::io(output, e))
        }
    }

    fn config(dir: &Path) -> SolverConfig {
        SolverConfig {
            working_dir: PathBuf::from(dir),
            ..Default::default()
        }
    }

    fn scene() -> Scene {
        let mut scene = Scene::default();
        scene
            .load_description("dipole", "CM DIPOLE\nGW 1 7 0 0 -50 0 0 50 0.5\nEN\n")
            .unwrap();
        scene
    }

    #[test]
    fn runner_failure_marks_failed_and_reports() {
        let dir = tempfile::tempdir().unwrap();
        let mut solver = Solver::new(FailingRunner, config(dir.path()), VisualConfig::default());
        let mut scene = scene();

        let err = solver.solve(&mut scene).unwrap_err();
        assert!(matches!(err, AntennaError::SolverExit(_)));
        assert_eq!(solver.state(), SolveState::Failed);
        assert_eq!(solver.metrics().snapshot().failures, 1);
        assert!(solver.messages().has_errors());
        assert!(dir.path().join("input.nec").exists());
        assert!(!scene.current_antenna().unwrap().field_computed());
    }

    #[test]
    fn missing_pattern_leaves_field_unset() {
        let dir = tempfile::tempdir().unwrap();
        let mut solver = Solver::new(TruncatedRunner, config(dir.path()), VisualConfig::default());
        let mut scene = scene();

        let err = solver.solve(&mut scene).unwrap_err();
        assert!(matches!(err, AntennaError::MissingSection(_)));
        assert!(!scene.current_antenna().unwrap().field_computed());
        // A failed solve may be retried.
        assert!(solver.solve(&mut scene).is_err());
        assert_eq!(solver.metrics().snapshot().failures, 2);
    }

    #[test]
    fn in_flight_state_rejects_new_solve() {
        let dir = tempfile::tempdir().unwrap();
        let mut solver = Solver::new(FailingRunner, config(dir.path()), VisualConfig::default());
        solver.state = SolveState::Invoking;
        let err = solver.solve(&mut scene()).unwrap_err();
        assert!(matches!(err, AntennaError::SolveInProgress));
    }

    #[test]
    fn empty_scene_has_nothing_to_solve() {
        let dir = tempfile::tempdir().unwrap();
        let mut solver = Solver::new(FailingRunner, config(dir.path()), VisualConfig::default());
        let mut scene = Scene::default();
        assert!(solver.solve_if_needed(&mut scene).unwrap().is_none());
        assert!(matches!(
            solver.solve(&mut scene),
            Err(AntennaError::NoCurrentAntenna)
        ));
    }
}
