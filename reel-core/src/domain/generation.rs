//! Generation request types

use serde::{Deserialize, Serialize};

/// Aspect ratio used when the caller does not pick one
pub const DEFAULT_ASPECT_RATIO: &str = "16:9";

/// A single request to a remote generation service
///
/// Requests are immutable once submitted. Rewriting the prompt (for example
/// after a content-policy rejection) produces a new request through
/// [`GenerationRequest::with_prompt`], leaving the original untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub aspect_ratio: String,
    /// Clip length in seconds, video only
    pub duration: Option<String>,
    /// Vendor size class (e.g. "small"), video only
    pub size: Option<String>,
    /// Publicly reachable URLs of reference images
    #[serde(default)]
    pub reference_images: Vec<String>,
    /// Identifier of a previous generation to continue from
    pub remix_target_id: Option<String>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            aspect_ratio: DEFAULT_ASPECT_RATIO.to_string(),
            duration: None,
            size: None,
            reference_images: Vec::new(),
            remix_target_id: None,
        }
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: impl Into<String>) -> Self {
        self.aspect_ratio = aspect_ratio.into();
        self
    }

    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = Some(duration.into());
        self
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn with_reference_image(mut self, url: impl Into<String>) -> Self {
        self.reference_images.push(url.into());
        self
    }

    pub fn with_remix_target(mut self, target_id: impl Into<String>) -> Self {
        self.remix_target_id = Some(target_id.into());
        self
    }

    /// Derive a new request that differs from this one only by its prompt
    pub fn with_prompt(&self, prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..self.clone()
        }
    }

    /// First `max_chars` characters of the prompt, for log lines
    pub fn prompt_preview(&self, max_chars: usize) -> String {
        let mut chars = self.prompt.chars();
        let preview: String = chars.by_ref().take(max_chars).collect();
        if chars.next().is_some() {
            format!("{}...", preview)
        } else {
            preview
        }
    }
}
