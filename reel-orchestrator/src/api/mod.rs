//! API Module
//!
//! HTTP control surface for the orchestrator.
//! Each submodule handles endpoints for a specific area.

pub mod error;
pub mod health;
pub mod job;
pub mod log;
pub mod workspace;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

use crate::service::JobOrchestrator;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<JobOrchestrator>,
    /// Wait per log-stream poll before a heartbeat is sent
    pub log_poll_timeout: Duration,
}

impl AppState {
    pub fn new(orchestrator: Arc<JobOrchestrator>, log_poll_timeout: Duration) -> Self {
        Self {
            orchestrator,
            log_poll_timeout,
        }
    }
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Job endpoints
        .route("/api/generate", post(job::start_job))
        .route("/api/task_status", get(job::task_status))
        .route("/api/jobs", get(job::list_jobs))
        .route("/api/jobs/{id}", get(job::get_job))
        // Log stream
        .route("/api/logs", get(log::stream_logs))
        // Workspace endpoints
        .route("/api/work_dirs", get(workspace::list_workspaces))
        .route("/api/stats", get(workspace::workspace_stats))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
