use std::fmt;

use serde::{Deserialize, Serialize};

use crate::JobKind;

/// Composite identifier for one unit of work.
///
/// The four components scope a job the same way the shared volume is laid
/// out on disk; immutable once a job has been launched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobKey {
    pub project: String,
    pub subproject: String,
    pub task: String,
    pub version: String,
}

impl JobKey {
    pub fn new(
        project: impl Into<String>,
        subproject: impl Into<String>,
        task: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            subproject: subproject.into(),
            task: task.into(),
            version: version.into(),
        }
    }

    /// `{project}_{subproject}_{task}_{version}` — the shared prefix of
    /// every container name derived from this key.
    pub fn prefix(&self) -> String {
        format!(
            "{}_{}_{}_{}",
            self.project, self.subproject, self.task, self.version
        )
    }

    /// Container name addressing the job of the given kind.
    ///
    /// The name is the sole addressing key for a job; there is no separate
    /// job-id namespace.
    pub fn container_name(&self, kind: JobKind) -> String {
        format!("{}_{}", self.prefix(), kind.suffix())
    }
}

impl fmt::Display for JobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefix())
    }
}
