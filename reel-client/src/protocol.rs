//! Vendor protocol seam
//!
//! A [`TaskProtocol`] knows how to talk to one remote generation vendor: how
//! to create a task, how to read its status, and how to turn a finished
//! task's locator into an artifact. The retry, timeout and remediation logic
//! that is common to every vendor lives in [`crate::RemoteTaskClient`].

use async_trait::async_trait;
use reel_core::domain::generation::GenerationRequest;
use reel_core::domain::task::{RemoteTask, TaskSnapshot};

use crate::error::Result;

/// A generated result in its native in-memory form
pub trait Artifact: Send + Sync + 'static {
    /// File extension used when keeping a local copy
    fn extension(&self) -> &'static str;

    /// Bytes to write for a local copy
    ///
    /// Remote references (e.g. a playable URL) return `Ok(None)` and are
    /// never written to disk.
    fn encode(&self) -> anyhow::Result<Option<Vec<u8>>>;
}

/// Outcome of a task creation call
#[derive(Debug)]
pub enum Submission<A> {
    /// The vendor accepted the task and will process it out of band
    Queued(RemoteTask),
    /// The vendor answered with the finished artifact straight away
    Direct(A),
}

/// One remote vendor's submit/poll/fetch protocol
#[async_trait]
pub trait TaskProtocol: Send + Sync {
    type Artifact: Artifact;

    /// Short vendor/model name for log lines
    fn name(&self) -> &'static str;

    /// Creates a task
    ///
    /// Non-success responses and vendor error codes fail with
    /// [`crate::GenerationError::Submission`].
    async fn submit(&self, request: &GenerationRequest) -> Result<Submission<Self::Artifact>>;

    /// Queries the current status of a task
    async fn poll(&self, task_id: &str) -> Result<TaskSnapshot>;

    /// Turns the locator of a finished task into an artifact
    async fn fetch(&self, locator: &str) -> Result<Self::Artifact>;
}
