//! Error types for the generation clients

use std::time::Duration;
use thiserror::Error;

/// Result type alias for generation operations
pub type Result<T> = std::result::Result<T, GenerationError>;

/// Errors that can occur while generating an artifact
///
/// Only the vendor protocol modules look at vendor-specific response shapes;
/// everything above them sees these variants.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Service answered with a non-success status code
    #[error("API error (status {status}): {message}")]
    HttpStatus {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// Response body could not be understood
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Status query answered with a vendor-level error code
    #[error("Vendor error (code {code}): {message}")]
    Vendor { code: i64, message: String },

    /// Vendor refused to create the task
    #[error("Task creation failed: {0}")]
    Submission(String),

    /// Vendor rejected the task on content-policy grounds
    #[error(
        "Content policy rejected task {task_id}: {reason}{}",
        remediation_note(.remediated)
    )]
    PolicyRejected {
        task_id: String,
        reason: String,
        /// True when the rejected task already carried a rewritten prompt
        remediated: bool,
    },

    /// Vendor reported a terminal failure
    #[error("Generation task {task_id} failed: {reason}")]
    TaskFailed { task_id: String, reason: String },

    /// Polling attempts exhausted without a terminal status
    #[error("No result for task {task_id} after {attempts} polls ({elapsed:?})")]
    Timeout {
        task_id: String,
        attempts: u32,
        /// `attempts × poll interval`, a soft bound on the elapsed time
        elapsed: Duration,
    },
}

fn remediation_note(remediated: &bool) -> &'static str {
    if *remediated {
        " (remediated prompt rejected as well)"
    } else {
        ""
    }
}

impl GenerationError {
    /// Create an HTTP status error from status code and body
    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            message: message.into(),
        }
    }

    /// Check if a poll attempt failing with this error may simply be retried
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::HttpStatus { .. } | Self::Decode(_) | Self::Vendor { .. }
        )
    }

    /// Check if this error is a content-policy rejection
    pub fn is_policy_rejection(&self) -> bool {
        matches!(self, Self::PolicyRejected { .. })
    }
}
