//! Core of the antenna visualizer: wire geometry, the solver card format and
//! subprocess, radiation-pattern statistics and the meshes built from them.
//!
//! Everything here is single-writer. The only external process is the solver
//! launched through a [`prelude::SolverRunner`].

pub mod field;
pub mod geometry;
pub mod prelude;
pub mod scene;
pub mod solver;
pub mod telemetry;

pub use prelude::{AntennaError, AntennaMode, AntennaResult, SolverConfig, SolverRunner, VisualConfig};
