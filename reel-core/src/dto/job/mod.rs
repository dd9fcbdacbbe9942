//! Job DTOs for the control surface

use serde::{Deserialize, Serialize};

use crate::domain::job::JobRequest;

/// Body of `POST /api/generate`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartJob {
    #[serde(flatten)]
    pub request: JobRequest,
    /// Workspace to reuse; a fresh one is created when absent
    #[serde(default)]
    pub work_dir: Option<String>,
}

/// Reply to an accepted or rejected start request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartJobResponse {
    pub status: String,
    pub message: String,
    pub work_dir: Option<String>,
    pub job_id: Option<String>,
}

impl StartJobResponse {
    pub fn accepted(job_id: impl Into<String>, work_dir: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: "Video generation started".to_string(),
            work_dir: Some(work_dir.into()),
            job_id: Some(job_id.into()),
        }
    }
}

/// Body of `GET /api/task_status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStatusResponse {
    pub running: bool,
    pub working_dir: Option<String>,
}
