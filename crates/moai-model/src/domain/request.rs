use serde::{Deserialize, Serialize};

use crate::{Hyps, JobKey, TrainParams};

/// Launch a training job.
///
/// `model_type` doubles as the container image name (`{model_type}:latest`)
/// and the conda environment the entry point runs in; it is persisted next
/// to the version's artifacts so later inference/export jobs can recover it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainRequest {
    #[serde(flatten)]
    pub key: JobKey,
    pub model_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub train_params: Option<TrainParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hyps: Option<Hyps>,
}

/// Launch a detection job over a previously trained version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceRequest {
    #[serde(flatten)]
    pub key: JobKey,
    /// Name of the output directory for this detection run.
    pub inference_name: String,
    pub imgsz: u32,
}

/// Launch a model export for a previously trained version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRequest {
    #[serde(flatten)]
    pub key: JobKey,
}

/// Stop whatever train/inference job is active for the key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopRequest {
    #[serde(flatten)]
    pub key: JobKey,
}

/// Start or stop the TensorBoard container for the key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TensorboardRequest {
    #[serde(flatten)]
    pub key: JobKey,
}
