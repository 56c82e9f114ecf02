use crate::report::model::VisualizationModel;
use anyhow::Context;
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

/// Holds the latest model and writes it out as JSON when a path is set.
pub struct ReportPublisher {
    path: Option<PathBuf>,
    state: RwLock<VisualizationModel>,
}

impl ReportPublisher {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
            state: RwLock::new(VisualizationModel::default()),
        }
    }

    pub fn publish(&self, model: &VisualizationModel) -> anyhow::Result<()> {
        if let Ok(mut guard) = self.state.write() {
            *guard = model.clone();
        }
        println!(
            "[antvis] antennas: {}, mesh vertices: {}, points: {}",
            model.antennas.len(),
            model.mesh.vertices,
            model.mesh.points
        );

        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating report directory {}", parent.display()))?;
        }
        let json = model.to_json().context("serializing visualization model")?;
        fs::write(path, json).with_context(|| format!("writing report {}", path.display()))?;
        Ok(())
    }

    pub fn publish_status(&self, message: &str) {
        println!("[antvis] {}", message);
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> VisualizationModel {
        self.state.read().map(|m| m.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use antcore::prelude::AntennaMode;

    #[test]
    fn publisher_keeps_latest_model_and_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports/run.json");
        let publisher = ReportPublisher::new(Some(path.clone()));

        let model = VisualizationModel {
            mode: AntennaMode::Multiple,
            current: Some(1),
            ..Default::default()
        };
        publisher.publish(&model).unwrap();

        assert_eq!(publisher.snapshot().current, Some(1));
        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(written["mode"], "multiple");
    }

    #[test]
    fn publisher_without_path_only_updates_state() {
        let publisher = ReportPublisher::new(None);
        publisher.publish(&VisualizationModel::default()).unwrap();
        assert!(publisher.snapshot().antennas.is_empty());
    }
}
