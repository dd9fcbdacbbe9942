//! API client module
//!
//! HTTP client for communicating with the Reel orchestrator API.

mod events;

pub use events::EventDecoder;

use anyhow::{Context, Result};
use reel_core::domain::job::JobRecord;
use reel_core::dto::job::{StartJob, StartJobResponse, TaskStatusResponse};
use reel_core::dto::workspace::{WorkspaceList, WorkspaceStats};
use reqwest::Client;

/// HTTP client for the Reel orchestrator API
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    /// Create a new API client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the orchestrator API
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// Start a generation job
    ///
    /// # Arguments
    /// * `req` - What to generate and where
    ///
    /// # Returns
    /// The accepted job's id and workspace
    pub async fn start_job(&self, req: &StartJob) -> Result<StartJobResponse> {
        let url = format!("{}/api/generate", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(req)
            .send()
            .await
            .context("Failed to send start job request")?;

        self.handle_response(response).await
    }

    /// Whether a job is running right now
    pub async fn task_status(&self) -> Result<TaskStatusResponse> {
        let url = format!("{}/api/task_status", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send task status request")?;

        self.handle_response(response).await
    }

    /// List every job known to the orchestrator, newest first
    pub async fn list_jobs(&self) -> Result<Vec<JobRecord>> {
        let url = format!("{}/api/jobs", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send list jobs request")?;

        self.handle_response(response).await
    }

    /// Get a job by id
    ///
    /// # Arguments
    /// * `id` - The job id (its workspace name)
    pub async fn get_job(&self, id: &str) -> Result<JobRecord> {
        let url = format!("{}/api/jobs/{}", self.base_url, id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send get job request")?;

        self.handle_response(response).await
    }

    pub async fn list_workspaces(&self) -> Result<WorkspaceList> {
        let url = format!("{}/api/work_dirs", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send list workspaces request")?;

        self.handle_response(response).await
    }

    pub async fn workspace_stats(&self, work_dir: &str) -> Result<WorkspaceStats> {
        let url = format!("{}/api/stats", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("work_dir", work_dir)])
            .send()
            .await
            .context("Failed to send workspace stats request")?;

        self.handle_response(response).await
    }

    /// Open the live log stream
    ///
    /// The response body never ends on its own; read it with
    /// [`reqwest::Response::chunk`] and an [`EventDecoder`].
    pub async fn open_log_stream(&self) -> Result<reqwest::Response> {
        let url = format!("{}/api/logs", self.base_url);
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await
            .context("Failed to connect to the log stream")?;

        if !response.status().is_success() {
            anyhow::bail!("Log stream refused with status {}", response.status());
        }
        Ok(response)
    }

    /// Handle API response and deserialize JSON
    ///
    /// Error bodies carry `{"status":"error","message":...}`; the message is
    /// surfaced when present.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "Request failed with status {}: {}",
                status,
                error_message(&error_text)
            );
        }

        response
            .json()
            .await
            .context("Failed to parse response JSON")
    }
}

/// Extracts `message` from an error body, falling back to the raw text
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}
