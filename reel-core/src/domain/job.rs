//! Job domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What the caller asked a job to produce
///
/// Exactly one of `idea` or `script` drives the pipeline; when both are
/// present the script wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRequest {
    #[serde(default)]
    pub idea: Option<String>,
    #[serde(default)]
    pub script: Option<String>,
    #[serde(default)]
    pub user_requirement: String,
    #[serde(default)]
    pub style: String,
}

impl JobRequest {
    pub fn from_idea(idea: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            idea: Some(idea.into()),
            style: style.into(),
            ..Default::default()
        }
    }

    /// The non-blank script or idea text, script first
    pub fn brief(&self) -> Option<&str> {
        [self.script.as_deref(), self.idea.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|text| !text.is_empty())
    }
}

/// Job execution record
///
/// Owned by the orchestrator, mutated only by the job's own background task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    /// Workspace name, also the job identifier
    pub id: String,
    pub work_dir: PathBuf,
    pub status: JobStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub request: JobRequest,
    /// Final artifact, set only when Completed
    pub artifact: Option<PathBuf>,
    /// Error text, set only when Failed
    pub error: Option<String>,
}

impl JobRecord {
    pub fn running(id: impl Into<String>, work_dir: PathBuf, request: JobRequest) -> Self {
        Self {
            id: id.into(),
            work_dir,
            status: JobStatus::Running,
            started_at: Utc::now(),
            finished_at: None,
            request,
            artifact: None,
            error: None,
        }
    }
}

/// Job execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Running,
    Completed,
    Failed,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Running => write!(f, "running"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brief_prefers_script() {
        let request = JobRequest {
            idea: Some("an idea".to_string()),
            script: Some("EXT. FOREST - DAY".to_string()),
            ..Default::default()
        };
        assert_eq!(request.brief(), Some("EXT. FOREST - DAY"));
    }

    #[test]
    fn test_brief_skips_blank() {
        let request = JobRequest {
            idea: Some("cat and tiger explore a forest".to_string()),
            script: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(request.brief(), Some("cat and tiger explore a forest"));
        assert_eq!(JobRequest::default().brief(), None);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&JobStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
    }
}
