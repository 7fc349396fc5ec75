use std::fs;
use std::io;

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::debug;

use moai_model::{JobKey, TrainConfig};

use crate::{CoreError, CoreResult, MountLayout};

/// Reads and writes the per-version `train_config.yaml` record.
///
/// The record is written when a train job launches and read back by
/// inference/export to recover the model type. It is never deleted;
/// re-training a version overwrites it.
pub struct TrainConfigStore {
    layout: MountLayout,
}

impl TrainConfigStore {
    pub fn new(layout: MountLayout) -> Self {
        Self { layout }
    }

    pub fn write(&self, key: &JobKey, model_type: &str) -> CoreResult<TrainConfig> {
        let created_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .map_err(|err| store_error(key, err))?;
        let config = TrainConfig::new(key, model_type, created_at);

        let path = self.layout.train_config_file(key);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|err| store_error(key, err))?;
        }

        let yaml = serde_yaml::to_string(&config).map_err(|err| store_error(key, err))?;
        fs::write(&path, yaml).map_err(|err| store_error(key, err))?;

        debug!(key = %key, model_type, "train config written");
        Ok(config)
    }

    pub fn read(&self, key: &JobKey) -> CoreResult<TrainConfig> {
        let path = self.layout.train_config_file(key);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(CoreError::NotFound(format!("train config for {key}")));
            }
            Err(err) => return Err(store_error(key, err)),
        };

        serde_yaml::from_str(&raw).map_err(|err| store_error(key, err))
    }
}

fn store_error(key: &JobKey, err: impl std::fmt::Display) -> CoreError {
    CoreError::TrainConfig {
        key: key.to_string(),
        reason: err.to_string(),
    }
}
