//! Reel Core
//!
//! Core types and abstractions shared by the Reel generation services.
//!
//! This crate contains:
//! - Domain types: generation requests, remote tasks, job records, log entries
//! - DTOs: request/response bodies of the orchestrator control surface
//! - The `LogSink` trait that every component narrates its progress through

pub mod domain;
pub mod dto;
pub mod sink;

pub use sink::{LogSink, NullSink};
