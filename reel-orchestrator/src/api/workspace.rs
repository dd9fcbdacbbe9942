//! Workspace API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use reel_core::dto::workspace::{WorkspaceList, WorkspaceStats};
use serde::Deserialize;

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::service::workspace;

/// GET /api/work_dirs
/// List every workspace under the root, newest first
pub async fn list_workspaces(State(state): State<AppState>) -> Json<WorkspaceList> {
    let orchestrator = &state.orchestrator;
    Json(WorkspaceList {
        work_dirs: workspace::list(orchestrator.workspace_root(), orchestrator.registry()),
    })
}

/// Query parameters for workspace stats
#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    #[serde(default)]
    pub work_dir: Option<String>,
}

/// GET /api/stats?work_dir=
/// File statistics for one workspace
pub async fn workspace_stats(
    State(state): State<AppState>,
    Query(params): Query<StatsQuery>,
) -> ApiResult<Json<WorkspaceStats>> {
    let Some(requested) = params.work_dir.filter(|dir| !dir.trim().is_empty()) else {
        return Ok(Json(WorkspaceStats::default()));
    };

    let path = workspace::resolve(state.orchestrator.workspace_root(), &requested)
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid work_dir: {}", requested)))?;

    tracing::debug!("Computing stats for {}", path.display());
    Ok(Json(workspace::stats(&path)))
}
