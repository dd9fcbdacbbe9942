//! Orchestrator configuration
//!
//! Everything is read from `REEL_*` environment variables; anything unset
//! falls back to the defaults in [`Config::default`].

use reel_client::PollSettings;
use std::path::PathBuf;
use std::time::Duration;

/// Orchestrator configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP control surface listens on
    pub bind_addr: String,

    /// Directory under which every job workspace is created
    pub workspace_root: PathBuf,

    /// Vendor API key shared by the image and video services
    pub api_key: String,

    /// nano-banana base URL
    pub image_base_url: String,

    /// sora2 base URL
    pub video_base_url: String,

    pub image_poll: PollSettings,
    pub video_poll: PollSettings,

    /// Minimum spacing between two outbound vendor requests
    pub min_request_interval: Duration,

    /// Directory that keeps a copy of every generated image
    pub artifact_dir: PathBuf,

    /// How long the log stream waits for a line before sending a heartbeat
    pub log_poll_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5000".to_string(),
            workspace_root: PathBuf::from("working_dir_idea2video"),
            api_key: String::new(),
            image_base_url: reel_client::vendor::image::DEFAULT_BASE_URL.to_string(),
            video_base_url: reel_client::vendor::video::DEFAULT_BASE_URL.to_string(),
            image_poll: PollSettings::new(Duration::from_secs(5), 60),
            video_poll: PollSettings::new(Duration::from_secs(5), 120),
            min_request_interval: Duration::from_millis(1000),
            artifact_dir: PathBuf::from("generated_images"),
            log_poll_timeout: Duration::from_millis(1000),
        }
    }
}

impl Config {
    /// Creates configuration from environment variables
    ///
    /// Recognised variables (all optional):
    /// - REEL_BIND_ADDR (default: 0.0.0.0:5000)
    /// - REEL_WORKSPACE_ROOT (default: working_dir_idea2video)
    /// - REEL_API_KEY
    /// - REEL_IMAGE_BASE_URL / REEL_VIDEO_BASE_URL
    /// - REEL_IMAGE_POLL_INTERVAL (seconds, default: 5) / REEL_IMAGE_MAX_POLLS (default: 60)
    /// - REEL_VIDEO_POLL_INTERVAL (seconds, default: 5) / REEL_VIDEO_MAX_POLLS (default: 120)
    /// - REEL_MIN_REQUEST_INTERVAL_MS (default: 1000)
    /// - REEL_ARTIFACT_DIR (default: generated_images)
    /// - REEL_LOG_POLL_TIMEOUT_MS (default: 1000)
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let string = |key: &str, default: String| lookup(key).unwrap_or(default);
        let number = |key: &str| -> anyhow::Result<Option<u64>> {
            match lookup(key) {
                Some(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .map(Some)
                    .map_err(|_| anyhow::anyhow!("{} must be a non-negative integer, got {:?}", key, raw)),
                None => Ok(None),
            }
        };

        let poll = |interval_key: &str, max_key: &str, default: PollSettings| -> anyhow::Result<PollSettings> {
            let interval = number(interval_key)?
                .map(Duration::from_secs)
                .unwrap_or(default.interval);
            let max_attempts = match number(max_key)? {
                Some(max) => u32::try_from(max)
                    .map_err(|_| anyhow::anyhow!("{} is too large", max_key))?,
                None => default.max_attempts,
            };
            Ok(PollSettings::new(interval, max_attempts))
        };

        Ok(Self {
            bind_addr: string("REEL_BIND_ADDR", defaults.bind_addr),
            workspace_root: lookup("REEL_WORKSPACE_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.workspace_root),
            api_key: string("REEL_API_KEY", defaults.api_key),
            image_base_url: string("REEL_IMAGE_BASE_URL", defaults.image_base_url),
            video_base_url: string("REEL_VIDEO_BASE_URL", defaults.video_base_url),
            image_poll: poll(
                "REEL_IMAGE_POLL_INTERVAL",
                "REEL_IMAGE_MAX_POLLS",
                defaults.image_poll,
            )?,
            video_poll: poll(
                "REEL_VIDEO_POLL_INTERVAL",
                "REEL_VIDEO_MAX_POLLS",
                defaults.video_poll,
            )?,
            min_request_interval: number("REEL_MIN_REQUEST_INTERVAL_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.min_request_interval),
            artifact_dir: lookup("REEL_ARTIFACT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.artifact_dir),
            log_poll_timeout: number("REEL_LOG_POLL_TIMEOUT_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.log_poll_timeout),
        })
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bind_addr.is_empty() {
            anyhow::bail!("bind_addr cannot be empty");
        }

        if self.workspace_root.as_os_str().is_empty() {
            anyhow::bail!("workspace_root cannot be empty");
        }

        for (name, url) in [
            ("image_base_url", &self.image_base_url),
            ("video_base_url", &self.video_base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("{} must start with http:// or https://", name);
            }
        }

        if self.image_poll.max_attempts == 0 || self.video_poll.max_attempts == 0 {
            anyhow::bail!("max poll attempts must be greater than 0");
        }

        if self.log_poll_timeout.is_zero() {
            anyhow::bail!("log_poll_timeout must be greater than 0");
        }

        Ok(())
    }
}
