use std::path::{Path, PathBuf};

use moai_model::JobKey;

/// Container-side mount point of the shared volume. Every job container
/// gets the configured host path bound read-write here.
pub const CONTAINER_MOUNT: &str = "/moai";

const RESULTS_DIR: &str = "training_results";
const RESULTS_FILE: &str = "results.csv";
const TRAIN_CONFIG_FILE: &str = "train_config.yaml";
const IN_PROGRESS_DIR: &str = "in_progress";
const WEIGHTS_DIR: &str = "weights";

/// Path arithmetic over the shared volume.
///
/// All project data lives under `{root}/{project}/{subproject}/{task}/{version}`;
/// this type is the single place that spelling is encoded.
#[derive(Debug, Clone)]
pub struct MountLayout {
    root: PathBuf,
}

impl MountLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Host path of the shared volume.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn version_dir(&self, key: &JobKey) -> PathBuf {
        self.root
            .join(&key.project)
            .join(&key.subproject)
            .join(&key.task)
            .join(&key.version)
    }

    /// The training results artifact whose existence signals completion.
    pub fn results_file(&self, key: &JobKey) -> PathBuf {
        self.version_dir(key).join(RESULTS_DIR).join(RESULTS_FILE)
    }

    pub fn train_config_file(&self, key: &JobKey) -> PathBuf {
        self.version_dir(key).join(TRAIN_CONFIG_FILE)
    }

    /// Where the training process writes weights while it is still running.
    pub fn in_progress_dir(&self, key: &JobKey) -> PathBuf {
        self.version_dir(key).join(RESULTS_DIR).join(IN_PROGRESS_DIR)
    }

    /// Final home of weight files after training finishes or is stopped.
    pub fn weights_dir(&self, key: &JobKey) -> PathBuf {
        self.version_dir(key).join(RESULTS_DIR).join(WEIGHTS_DIR)
    }

    /// Container-side log directory handed to TensorBoard.
    pub fn container_logdir(&self, key: &JobKey) -> String {
        format!(
            "{}/{}/{}/{}/{}/{}",
            CONTAINER_MOUNT, key.project, key.subproject, key.task, key.version, RESULTS_DIR
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> JobKey {
        JobKey::new("proj", "sub", "detect", "v1")
    }

    #[test]
    fn version_dir_mirrors_key_components() {
        let layout = MountLayout::new("/data/moai");
        assert_eq!(
            layout.version_dir(&key()),
            PathBuf::from("/data/moai/proj/sub/detect/v1")
        );
    }

    #[test]
    fn results_and_config_paths() {
        let layout = MountLayout::new("/data/moai");
        assert_eq!(
            layout.results_file(&key()),
            PathBuf::from("/data/moai/proj/sub/detect/v1/training_results/results.csv")
        );
        assert_eq!(
            layout.train_config_file(&key()),
            PathBuf::from("/data/moai/proj/sub/detect/v1/train_config.yaml")
        );
    }

    #[test]
    fn weight_directories_live_under_results() {
        let layout = MountLayout::new("/data/moai");
        assert_eq!(
            layout.in_progress_dir(&key()),
            PathBuf::from("/data/moai/proj/sub/detect/v1/training_results/in_progress")
        );
        assert_eq!(
            layout.weights_dir(&key()),
            PathBuf::from("/data/moai/proj/sub/detect/v1/training_results/weights")
        );
    }

    #[test]
    fn container_logdir_is_container_side() {
        let layout = MountLayout::new("/data/moai");
        assert_eq!(
            layout.container_logdir(&key()),
            "/moai/proj/sub/detect/v1/training_results"
        );
    }
}
