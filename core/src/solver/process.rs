use crate::prelude::{AntennaError, AntennaResult, SolverConfig, SolverRunner};
use log::{debug, info, warn};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Runs the external solver as `<executable> <input> <output>` and waits for
/// it, optionally bounded by a timeout. The child is killed when the wait is
/// abandoned.
pub struct ProcessRunner {
    executable: String,
    timeout: Option<Duration>,
}

impl ProcessRunner {
    pub fn new(executable: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            executable: executable.into(),
            timeout,
        }
    }

    pub fn from_config(config: &SolverConfig) -> Self {
        Self::new(config.executable.clone(), config.timeout())
    }

    fn spawn_error(&self, source: std::io::Error) -> AntennaError {
        AntennaError::SolverSpawn {
            executable: self.executable.clone(),
            source,
        }
    }

    async fn run_child(&self, input: &Path, output: &Path) -> AntennaResult<()> {
        let child = Command::new(&self.executable)
            .arg(input)
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;
        debug!("spawned {} (pid {:?})", self.executable, child.id());

        let waited = child.wait_with_output();
        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, waited)
                .await
                .map_err(|_| AntennaError::SolverTimeout(limit))?,
            None => waited.await,
        };
        let output = result.map_err(|e| self.spawn_error(e))?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr.lines().last().unwrap_or("").trim();
            warn!("{} exited with {}", self.executable, output.status);
            Err(AntennaError::SolverExit(if detail.is_empty() {
                output.status.to_string()
            } else {
                format!("{}: {}", output.status, detail)
            }))
        }
    }
}

impl SolverRunner for ProcessRunner {
    fn run(&mut self, input: &Path, output: &Path) -> AntennaResult<()> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| self.spawn_error(e))?;
        info!("running {} on {}", self.executable, input.display());
        runtime.block_on(self.run_child(input, output))
    }
}
