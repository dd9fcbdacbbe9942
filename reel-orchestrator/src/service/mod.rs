//! Service Module
//!
//! Business logic layer for the orchestrator.

pub mod job;
pub mod log;
pub mod workspace;

pub use job::{JobError, JobOrchestrator};
pub use log::LogBus;
