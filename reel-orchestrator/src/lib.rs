//! Reel Orchestrator
//!
//! Accepts one generation job at a time, runs it on a background task and
//! exposes its progress over HTTP.
//!
//! Architecture:
//! - API: axum handlers for the control surface and the SSE log stream
//! - Service: the single-slot job orchestrator, the log bus and workspace views
//! - Repository: the in-memory job registry
//! - Pipeline: the job body, driven through the generation clients

pub mod api;
pub mod config;
pub mod pipeline;
pub mod repository;
pub mod service;

pub use config::Config;
