//! Job API Handlers
//!
//! HTTP endpoints for starting generation jobs and reading their state.

use axum::{
    Json,
    extract::{Path, State},
};
use reel_core::domain::job::JobRecord;
use reel_core::dto::job::{StartJob, StartJobResponse, TaskStatusResponse};

use crate::api::AppState;
use crate::api::error::ApiResult;

// =============================================================================
// Job Lifecycle Endpoints
// =============================================================================

/// POST /api/generate
/// Start a generation job in the background
pub async fn start_job(
    State(state): State<AppState>,
    Json(req): Json<StartJob>,
) -> ApiResult<Json<StartJobResponse>> {
    tracing::info!(
        "Generation requested (style: {:?}, work_dir: {:?})",
        req.request.style,
        req.work_dir
    );

    let record = state.orchestrator.start(req).await?;

    Ok(Json(StartJobResponse::accepted(
        record.id,
        record.work_dir.display().to_string(),
    )))
}

/// GET /api/task_status
/// Whether a job is running and which workspace it uses
pub async fn task_status(State(state): State<AppState>) -> Json<TaskStatusResponse> {
    Json(TaskStatusResponse {
        running: state.orchestrator.is_running(),
        working_dir: state
            .orchestrator
            .current_work_dir()
            .map(|dir| dir.display().to_string()),
    })
}

// =============================================================================
// Job Queries
// =============================================================================

/// GET /api/jobs
pub async fn list_jobs(State(state): State<AppState>) -> Json<Vec<JobRecord>> {
    tracing::debug!("Listing all jobs");
    Json(state.orchestrator.jobs())
}

/// GET /api/jobs/{id}
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<JobRecord>> {
    tracing::debug!("Getting job: {}", id);
    Ok(Json(state.orchestrator.job(&id)?))
}
