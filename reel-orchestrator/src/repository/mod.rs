//! Repository Module
//!
//! In-memory state owned by the orchestrator.

pub mod job;

pub use job::JobRegistry;
