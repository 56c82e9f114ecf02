use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default number of antennas a scene can hold.
pub const MAX_ANTENNAS: usize = 5;

/// Display parameters shared by the mesh builder, boom derivation and the
/// solver deck writer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualConfig {
    /// Degrees between pattern samples on both angular axes.
    pub step_size: f64,
    pub point_distance_scale: f64,
    pub point_size_scale: f64,
    /// Fraction of the gain range below which a sample counts as a null.
    pub null_threshold: f64,
    pub null_distance: f64,
    pub alpha: f32,
    /// Boom height used when the description carries no ground directive.
    pub default_boom_height: f64,
    pub scale_factor: f64,
    /// Emit surface strips over the full longitude range instead of the
    /// historical `0..=increments/2` half.
    pub full_longitude_strips: bool,
    pub max_antennas: usize,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            step_size: 5.0,
            point_distance_scale: 1.0,
            point_size_scale: 0.05,
            null_threshold: 0.85,
            null_distance: 5.0,
            alpha: 0.8,
            default_boom_height: 10.0,
            scale_factor: 1.0,
            full_longitude_strips: false,
            max_antennas: MAX_ANTENNAS,
        }
    }
}

impl VisualConfig {
    /// Integer step written into the `RP` card. Fractional steps truncate.
    pub fn pattern_step(&self) -> u32 {
        (self.step_size as u32).max(1)
    }
}

/// Where and how the external solver is invoked.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub executable: String,
    pub working_dir: PathBuf,
    pub input_file: String,
    pub output_file: String,
    pub timeout_secs: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            executable: "nec2".to_string(),
            working_dir: PathBuf::from("."),
            input_file: "input.nec".to_string(),
            output_file: "output.nec".to_string(),
            timeout_secs: Some(300),
        }
    }
}

impl SolverConfig {
    pub fn input_path(&self) -> PathBuf {
        self.working_dir.join(&self.input_file)
    }

    pub fn output_path(&self) -> PathBuf {
        self.working_dir.join(&self.output_file)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Whether a solve covers the current antenna or every antenna in the scene.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AntennaMode {
    #[default]
    Single,
    Multiple,
}

/// Common error type for every core operation.
#[derive(thiserror::Error, Debug)]
pub enum AntennaError {
    #[error("i/o failure on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed geometry: {0}")]
    MalformedGeometry(String),
    #[error("scene already holds the maximum of {0} antennas")]
    CapacityExceeded(usize),
    #[error("no current antenna")]
    NoCurrentAntenna,
    #[error("no element selected")]
    NoCurrentElement,
    #[error("could not start solver {executable}: {source}")]
    SolverSpawn {
        executable: String,
        #[source]
        source: std::io::Error,
    },
    #[error("solver exited abnormally: {0}")]
    SolverExit(String),
    #[error("solver did not finish within {0:?}")]
    SolverTimeout(Duration),
    #[error("solver output has no {0} section")]
    MissingSection(&'static str),
    #[error("a solve is already in progress")]
    SolveInProgress,
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl AntennaError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        AntennaError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

pub type AntennaResult<T> = Result<T, AntennaError>;

/// Capability to run the external solver on an input deck, producing an
/// output listing. Substitutable with a mock or a synthetic solver.
pub trait SolverRunner {
    fn run(&mut self, input: &Path, output: &Path) -> AntennaResult<()>;
}

impl<R: SolverRunner + ?Sized> SolverRunner for Box<R> {
    fn run(&mut self, input: &Path, output: &Path) -> AntennaResult<()> {
        (**self).run(input, output)
    }
}
