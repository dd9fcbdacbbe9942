//! Workspace DTOs for the control surface

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::job::JobStatus;

/// One job workspace found under the workspace root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceSummary {
    pub name: String,
    pub path: String,
    /// Whether the final video exists
    pub has_video: bool,
    pub created: Option<DateTime<Utc>>,
    /// Known only for jobs started by this orchestrator instance
    pub status: Option<JobStatus>,
}

/// Body of `GET /api/work_dirs`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkspaceList {
    pub work_dirs: Vec<WorkspaceSummary>,
}

/// Size and modification time of a notable workspace file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileInfo {
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
}

/// Body of `GET /api/stats`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkspaceStats {
    pub total_files: u64,
    pub total_size: u64,
    pub main_files: BTreeMap<String, FileInfo>,
}
