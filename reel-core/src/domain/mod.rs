//! Core domain types
//!
//! This module contains the core domain structures used across Reel services.
//! Generation and task types are produced by the vendor clients, job records are
//! owned by the orchestrator, and log entries flow between all of them.

pub mod generation;
pub mod job;
pub mod log;
pub mod task;
