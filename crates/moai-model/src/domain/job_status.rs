use serde::{Deserialize, Serialize};

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JobStatus {
    /// Accepted but not yet acting on the container runtime.
    Created,
    /// Stale container replacement and container creation in progress.
    Launching,
    /// The job command is executing inside its container.
    Running,
    /// Completion was detected and the container cleaned up.
    Succeeded,
    /// The container failed to start, exited early, or timed out.
    Failed,
    /// An explicit stop request ended the job.
    Stopped,
}

impl JobStatus {
    /// Returns `true` if the job will not transition further.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Succeeded | JobStatus::Failed | JobStatus::Stopped
        )
    }

    /// Returns `true` if the job still owns (or is about to own) a
    /// container.
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(JobStatus::Succeeded.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::Stopped.is_terminal());

        assert!(!JobStatus::Created.is_terminal());
        assert!(!JobStatus::Launching.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
    }

    #[test]
    fn active_is_complement_of_terminal() {
        for status in [
            JobStatus::Created,
            JobStatus::Launching,
            JobStatus::Running,
            JobStatus::Succeeded,
            JobStatus::Failed,
            JobStatus::Stopped,
        ] {
            assert_eq!(status.is_active(), !status.is_terminal());
        }
    }

    #[test]
    fn serde_roundtrip() {
        let status = JobStatus::Running;
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, r#""running""#);

        let back: JobStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, status);
    }
}
