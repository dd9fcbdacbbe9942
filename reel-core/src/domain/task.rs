//! Remote task domain types
//!
//! A remote task is a unit of work tracked by the generation vendor through an
//! opaque identifier. Its state is only ever changed by what the vendor reports
//! on a status poll; the client never advances it on its own.

use serde::{Deserialize, Serialize};

/// Abstract status every vendor status code reduces to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Queued,
    Processing,
    Succeeded,
    Failed,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Queued => write!(f, "Queued"),
            TaskStatus::Processing => write!(f, "Processing"),
            TaskStatus::Succeeded => write!(f, "Succeeded"),
            TaskStatus::Failed => write!(f, "Failed"),
        }
    }
}

/// What a single status poll reported
///
/// `status` is `None` when the vendor answered with a code this client does
/// not recognise; `raw_status` keeps the original code for logging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskSnapshot {
    pub status: Option<TaskStatus>,
    pub raw_status: Option<i64>,
    pub locator: Option<String>,
    pub failure_reason: Option<String>,
}

/// A task accepted by the remote vendor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTask {
    pub id: String,
    pub status: TaskStatus,
    pub locator: Option<String>,
    pub failure_reason: Option<String>,
}

impl RemoteTask {
    /// A freshly submitted task
    pub fn queued(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: TaskStatus::Queued,
            locator: None,
            failure_reason: None,
        }
    }

    /// Applies a poll response to this task
    ///
    /// An unrecognised status leaves the previous status in place.
    pub fn apply(&mut self, snapshot: &TaskSnapshot) {
        if let Some(status) = snapshot.status {
            self.status = status;
        }
        self.locator = snapshot.locator.clone();
        self.failure_reason = snapshot.failure_reason.clone();
    }

    /// The result locator, if the vendor sent a non-blank one
    pub fn ready_locator(&self) -> Option<&str> {
        self.locator
            .as_deref()
            .map(str::trim)
            .filter(|locator| !locator.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrecognised_status_keeps_previous() {
        let mut task = RemoteTask::queued("t-1");
        task.apply(&TaskSnapshot {
            status: Some(TaskStatus::Processing),
            ..Default::default()
        });
        task.apply(&TaskSnapshot {
            status: None,
            raw_status: Some(7),
            ..Default::default()
        });

        assert_eq!(task.status, TaskStatus::Processing);
    }

    #[test]
    fn test_ready_locator_ignores_blank() {
        let mut task = RemoteTask::queued("t-1");
        task.apply(&TaskSnapshot {
            status: Some(TaskStatus::Succeeded),
            locator: Some("   ".to_string()),
            ..Default::default()
        });
        assert_eq!(task.ready_locator(), None);

        task.apply(&TaskSnapshot {
            status: Some(TaskStatus::Succeeded),
            locator: Some("https://cdn.example/a.png".to_string()),
            ..Default::default()
        });
        assert_eq!(task.ready_locator(), Some("https://cdn.example/a.png"));
    }
}
