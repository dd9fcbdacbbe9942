//! Job Service
//!
//! Runs at most one generation job at a time on a background task and keeps
//! its record up to date.

use reel_core::LogSink;
use reel_core::domain::job::JobRecord;
use reel_core::dto::job::StartJob;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::pipeline::{Pipeline, PipelineContext};
use crate::repository::JobRegistry;
use crate::service::log::LogBus;
use crate::service::workspace;

/// Service error type
#[derive(Debug, Error)]
pub enum JobError {
    #[error("A generation task is already running, please wait for it to finish")]
    AlreadyRunning,

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Job {0} not found")]
    NotFound(String),

    #[error("Failed to prepare workspace: {0}")]
    Io(#[from] std::io::Error),
}

/// Single-slot background job runner
pub struct JobOrchestrator {
    registry: Arc<JobRegistry>,
    log_bus: Arc<LogBus>,
    pipeline: Arc<dyn Pipeline>,
    /// One permit; held by the running job's task
    slot: Arc<Semaphore>,
    workspace_root: PathBuf,
    /// Workspace of the most recently started job
    current_work_dir: RwLock<Option<PathBuf>>,
}

impl JobOrchestrator {
    pub fn new(
        workspace_root: impl Into<PathBuf>,
        pipeline: Arc<dyn Pipeline>,
        log_bus: Arc<LogBus>,
    ) -> Self {
        Self {
            registry: Arc::new(JobRegistry::new()),
            log_bus,
            pipeline,
            slot: Arc::new(Semaphore::new(1)),
            workspace_root: workspace_root.into(),
            current_work_dir: RwLock::new(None),
        }
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    pub fn log_bus(&self) -> Arc<LogBus> {
        Arc::clone(&self.log_bus)
    }

    /// Whether a job currently holds the slot
    pub fn is_running(&self) -> bool {
        self.slot.available_permits() == 0
    }

    pub fn current_work_dir(&self) -> Option<PathBuf> {
        self.current_work_dir
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Accepts a job and starts it in the background
    ///
    /// Fails with [`JobError::AlreadyRunning`] while another job holds the
    /// slot; there is no queue.
    pub async fn start(&self, start: StartJob) -> Result<JobRecord, JobError> {
        if start.request.brief().is_none() {
            return Err(JobError::InvalidRequest(
                "Please provide an idea or a script".to_string(),
            ));
        }

        let permit = Arc::clone(&self.slot)
            .try_acquire_owned()
            .map_err(|_| JobError::AlreadyRunning)?;

        let work_dir = match start.work_dir.as_deref().map(str::trim) {
            Some(requested) if !requested.is_empty() => {
                workspace::resolve(&self.workspace_root, requested).ok_or_else(|| {
                    JobError::InvalidRequest(format!("Invalid work_dir: {}", requested))
                })?
            }
            _ => self.workspace_root.join(Uuid::new_v4().to_string()),
        };
        let job_id = work_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| JobError::InvalidRequest("work_dir has no name".to_string()))?;

        let dropped = self.log_bus.clear().await;
        if dropped > 0 {
            info!("Discarded {} stale log lines", dropped);
        }

        tokio::fs::create_dir_all(&work_dir).await?;

        let record = JobRecord::running(job_id.clone(), work_dir.clone(), start.request);
        self.registry.insert(record.clone());
        *self
            .current_work_dir
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(work_dir.clone());

        info!("Job {} accepted, workspace {}", job_id, work_dir.display());
        self.log_bus.info(format!(
            "🚀 Starting video generation in {}",
            work_dir.display()
        ));

        self.spawn_job_task(record.clone(), permit);

        Ok(record)
    }

    /// Looks up one job
    pub fn job(&self, id: &str) -> Result<JobRecord, JobError> {
        self.registry
            .get(id)
            .ok_or_else(|| JobError::NotFound(id.to_string()))
    }

    pub fn jobs(&self) -> Vec<JobRecord> {
        self.registry.list()
    }

    /// Waits until no job holds the slot
    pub async fn wait_idle(&self) {
        // Only fails once the semaphore is closed, which never happens
        let _ = self.slot.acquire().await;
    }

    /// Spawns the task that owns the slot for the lifetime of the job
    fn spawn_job_task(
        &self,
        record: JobRecord,
        permit: OwnedSemaphorePermit,
    ) {
        let registry = Arc::clone(&self.registry);
        let log_bus = Arc::clone(&self.log_bus);
        let pipeline = Arc::clone(&self.pipeline);

        tokio::spawn(async move {
            let _permit = permit;
            let job_id = record.id;

            let ctx = PipelineContext {
                request: record.request,
                work_dir: record.work_dir,
                log: log_bus.clone(),
            };

            // Inner task so a panicking pipeline still lets us record the failure
            let outcome = tokio::spawn(async move { pipeline.run(ctx).await }).await;

            match outcome {
                Ok(Ok(artifact)) => {
                    info!("Job {} completed: {}", job_id, artifact.display());
                    registry.complete(&job_id, artifact.clone());
                    log_bus.info(format!(
                        "✅ Video generation completed! Output: {}",
                        artifact.display()
                    ));
                }
                Ok(Err(e)) => {
                    let message = format!("{:#}", e);
                    error!("Job {} failed: {}", job_id, message);
                    registry.fail(&job_id, message.clone());
                    log_bus.error(format!("❌ Video generation failed: {}", message));
                }
                Err(join_error) => {
                    warn!("Job {} task panicked: {}", job_id, join_error);
                    registry.fail(&job_id, format!("Job task panicked: {}", join_error));
                    log_bus.error(format!("❌ Video generation crashed: {}", join_error));
                }
            }
            // Permit is released when dropped
        });
    }
}
