use serde::{Deserialize, Serialize};

use crate::JobKey;

/// Persisted record of a training launch.
///
/// Written as `train_config.yaml` inside the version directory when a train
/// job starts; inference and export read it back to recover which model
/// image to run. Never deleted — re-training the same version overwrites it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    pub project: String,
    pub subproject: String,
    pub task: String,
    pub version: String,
    pub model_type: String,
    /// RFC 3339 timestamp of the launch that wrote this record.
    pub created_at: String,
}

impl TrainConfig {
    pub fn new(key: &JobKey, model_type: impl Into<String>, created_at: impl Into<String>) -> Self {
        Self {
            project: key.project.clone(),
            subproject: key.subproject.clone(),
            task: key.task.clone(),
            version: key.version.clone(),
            model_type: model_type.into(),
            created_at: created_at.into(),
        }
    }

    pub fn key(&self) -> JobKey {
        JobKey::new(
            self.project.clone(),
            self.subproject.clone(),
            self.task.clone(),
            self.version.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_roundtrip() {
        let key = JobKey::new("proj", "sub", "detect", "v1");
        let config = TrainConfig::new(&key, "yolo", "2024-06-01T12:00:00Z");

        let yaml = serde_yaml::to_string(&config).unwrap();
        let back: TrainConfig = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(back, config);
        assert_eq!(back.key(), key);
    }

    #[test]
    fn yaml_has_flat_fields() {
        let key = JobKey::new("p", "s", "t", "v");
        let config = TrainConfig::new(&key, "yolo", "2024-01-01T00:00:00Z");
        let yaml = serde_yaml::to_string(&config).unwrap();

        assert!(yaml.contains("project: p"));
        assert!(yaml.contains("model_type: yolo"));
        assert!(yaml.contains("created_at:"));
    }
}
