//! Reel generation clients
//!
//! Asynchronous clients for remote image and video generation services that
//! accept a task, process it out of band and expose a status endpoint.
//!
//! [`RemoteTaskClient`] holds everything that is common to both vendors
//! (rate limiting, the bounded poll loop, content-policy remediation and
//! local persistence) and delegates the wire details to a [`TaskProtocol`].
//!
//! # Example
//!
//! ```no_run
//! use reel_client::{ImageClient, NanoBananaProtocol, PollSettings};
//! use reel_core::domain::generation::GenerationRequest;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let protocol = NanoBananaProtocol::new(reel_client::vendor::image::DEFAULT_BASE_URL, "api-key");
//!     let client = ImageClient::new(protocol, PollSettings::new(Duration::from_secs(5), 60));
//!
//!     let generation = client
//!         .generate(&GenerationRequest::new("a lighthouse at dusk"))
//!         .await?;
//!
//!     println!("Generated {:?}", generation.locator);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod protocol;
pub mod rate_limit;
pub mod remediation;
pub mod storage;
pub mod vendor;

// Re-export commonly used types
pub use client::{Generation, PollSettings, RemoteTaskClient};
pub use error::{GenerationError, Result};
pub use protocol::{Artifact, Submission, TaskProtocol};
pub use rate_limit::{MinIntervalLimiter, RateLimiter};
pub use remediation::{PromptRemediator, Remediation};
pub use storage::ArtifactStore;
pub use vendor::{ImageArtifact, NanoBananaProtocol, Sora2Protocol, VideoArtifact};

/// Image generation client
pub type ImageClient = RemoteTaskClient<NanoBananaProtocol>;

/// Video generation client
pub type VideoClient = RemoteTaskClient<Sora2Protocol>;
