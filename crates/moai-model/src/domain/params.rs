use serde::{Deserialize, Serialize};

/// Training knobs forwarded to the training entry point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainParams {
    /// Square input resolution in pixels.
    pub imgsz: u32,
    pub batch_size: u32,
    /// Backbone size selector, e.g. `"s"` or `"m"`.
    pub weight_type: String,
    pub epochs: u32,
    /// Early-stopping patience in epochs.
    pub patience: u32,
    /// Resume from the last checkpoint instead of starting fresh.
    #[serde(default)]
    pub resume: bool,
}

/// Augmentation / optimizer hyperparameters.
///
/// Boolean members are rendered as bare flags on the command line; the rest
/// as `--key=value` pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hyps {
    pub lr: f64,
    pub hsv: bool,
    pub degrees: f64,
    pub translate: f64,
    pub scale: f64,
    pub flipud: bool,
    pub fliplr: bool,
    pub mosaic: bool,
}
