//! Data Transfer Objects for the control surface
//!
//! Request and response bodies exchanged between the orchestrator HTTP API
//! and its callers (the web page, the CLI).

pub mod job;
pub mod log;
pub mod workspace;
