//! Configuration module
//!
//! Settings shared by every command, taken from flags or the environment.

use anyhow::{Result, anyhow};

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the orchestrator service
    pub server_url: String,
    /// Vendor API key for direct generations
    pub api_key: Option<String>,
}

impl Config {
    /// The API key, or an error telling the user how to provide one
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| anyhow!("An API key is required: pass --api-key or set REEL_API_KEY"))
    }
}
