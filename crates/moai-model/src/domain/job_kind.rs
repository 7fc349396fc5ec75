use serde::{Deserialize, Serialize};

/// The kind of containerized job driven by the orchestrator.
///
/// The kind determines the container name suffix, whether the job contends
/// for the exclusive GPU pool, and how completion is detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JobKind {
    /// Long-running training run; completion is signalled by a results
    /// artifact on the shared volume.
    Train,
    /// Detection over a trained model; completes when its process exits.
    Inference,
    /// Model export; completes when its process exits.
    Export,
    /// TensorBoard UI for a version's training logs.
    Tensorboard,
}

impl JobKind {
    /// Container name suffix for this kind.
    pub fn suffix(&self) -> &'static str {
        match self {
            JobKind::Train => "train",
            JobKind::Inference => "inference",
            JobKind::Export => "export",
            JobKind::Tensorboard => "tensorboard",
        }
    }

    /// Whether jobs of this kind require exclusive use of the GPU host.
    ///
    /// Export and TensorBoard are ancillary: they may run alongside
    /// anything else.
    pub fn is_exclusive(&self) -> bool {
        matches!(self, JobKind::Train | JobKind::Inference)
    }
}

/// Classify a container name as belonging to an ancillary job.
///
/// Ancillary containers never block an exclusive launch; everything else
/// that is alive counts as holding the GPU pool.
pub fn is_ancillary_name(name: &str) -> bool {
    name.ends_with("_export") || name.ends_with("_tensorboard")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffixes() {
        assert_eq!(JobKind::Train.suffix(), "train");
        assert_eq!(JobKind::Inference.suffix(), "inference");
        assert_eq!(JobKind::Export.suffix(), "export");
        assert_eq!(JobKind::Tensorboard.suffix(), "tensorboard");
    }

    #[test]
    fn exclusivity_classification() {
        assert!(JobKind::Train.is_exclusive());
        assert!(JobKind::Inference.is_exclusive());

        assert!(!JobKind::Export.is_exclusive());
        assert!(!JobKind::Tensorboard.is_exclusive());
    }

    #[test]
    fn ancillary_names() {
        assert!(is_ancillary_name("p_s_t_v1_export"));
        assert!(is_ancillary_name("p_s_t_v1_tensorboard"));

        assert!(!is_ancillary_name("p_s_t_v1_train"));
        assert!(!is_ancillary_name("p_s_t_v1_inference"));
        assert!(!is_ancillary_name("unrelated-container"));
    }

    #[test]
    fn serde_uses_camel_case() {
        let json = serde_json::to_string(&JobKind::Tensorboard).unwrap();
        assert_eq!(json, r#""tensorboard""#);

        let back: JobKind = serde_json::from_str(r#""train""#).unwrap();
        assert_eq!(back, JobKind::Train);
    }
}
