//! Generation pipeline
//!
//! The orchestrator runs whatever [`Pipeline`] it is given. [`ShotPipeline`]
//! is the shipped one: it turns a job request into a single shot by
//! generating a keyframe image and then a video seeded with it.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reel_client::vendor::download;
use reel_client::{Artifact, ImageArtifact, RemoteTaskClient, TaskProtocol, VideoArtifact};
use reel_core::LogSink;
use reel_core::domain::generation::GenerationRequest;
use reel_core::domain::job::JobRequest;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

pub const PROMPT_FILE: &str = "prompt.txt";
pub const KEYFRAME_FILE: &str = "keyframe.png";
pub const FINAL_VIDEO_FILE: &str = "final_video.mp4";

const SHOT_ASPECT_RATIO: &str = "16:9";
const SHOT_DURATION: &str = "10";
const SHOT_SIZE: &str = "small";

/// Everything a pipeline run gets to work with
#[derive(Clone)]
pub struct PipelineContext {
    pub request: JobRequest,
    /// Workspace directory, already created
    pub work_dir: PathBuf,
    pub log: Arc<dyn LogSink>,
}

/// A job body
#[async_trait]
pub trait Pipeline: Send + Sync {
    /// Runs the job to completion, returning the final artifact path
    async fn run(&self, ctx: PipelineContext) -> Result<PathBuf>;
}

/// Keyframe image → video → `final_video.mp4`
pub struct ShotPipeline<I, V>
where
    I: TaskProtocol<Artifact = ImageArtifact>,
    V: TaskProtocol<Artifact = VideoArtifact>,
{
    image: Arc<RemoteTaskClient<I>>,
    video: Arc<RemoteTaskClient<V>>,
    http: reqwest::Client,
}

impl<I, V> ShotPipeline<I, V>
where
    I: TaskProtocol<Artifact = ImageArtifact>,
    V: TaskProtocol<Artifact = VideoArtifact>,
{
    pub fn new(image: Arc<RemoteTaskClient<I>>, video: Arc<RemoteTaskClient<V>>) -> Self {
        Self {
            image,
            video,
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl<I, V> Pipeline for ShotPipeline<I, V>
where
    I: TaskProtocol<Artifact = ImageArtifact>,
    V: TaskProtocol<Artifact = VideoArtifact>,
{
    async fn run(&self, ctx: PipelineContext) -> Result<PathBuf> {
        let brief = ctx
            .request
            .brief()
            .context("Job request has neither an idea nor a script")?;
        let prompt = compose_prompt(&ctx.request, brief);

        let prompt_path = ctx.work_dir.join(PROMPT_FILE);
        tokio::fs::write(&prompt_path, &prompt)
            .await
            .with_context(|| format!("Failed to write {}", prompt_path.display()))?;
        ctx.log.info(format!("📝 Shot prompt: {}", prompt));

        // Keyframe
        ctx.log.info("🎨 Generating keyframe image...".to_string());
        let keyframe = self
            .image
            .generate(&GenerationRequest::new(prompt.clone()).with_aspect_ratio(SHOT_ASPECT_RATIO))
            .await
            .context("Keyframe generation failed")?;

        let keyframe_path = ctx.work_dir.join(KEYFRAME_FILE);
        let bytes = keyframe
            .artifact
            .encode()?
            .context("Keyframe image has no byte form")?;
        tokio::fs::write(&keyframe_path, &bytes)
            .await
            .with_context(|| format!("Failed to write {}", keyframe_path.display()))?;
        ctx.log
            .info(format!("🖼️ Keyframe saved to {}", keyframe_path.display()));

        // Video, seeded with the keyframe when it has a public URL
        let mut video_request = GenerationRequest::new(keyframe.prompt.clone())
            .with_aspect_ratio(SHOT_ASPECT_RATIO)
            .with_duration(SHOT_DURATION)
            .with_size(SHOT_SIZE);
        if let Some(url) = keyframe.artifact.locator.clone() {
            video_request = video_request.with_reference_image(url);
        }

        ctx.log.info("🎥 Generating video...".to_string());
        let video = self
            .video
            .generate(&video_request)
            .await
            .context("Video generation failed")?;

        let video_path = ctx.work_dir.join(FINAL_VIDEO_FILE);
        ctx.log
            .info(format!("⬇️ Downloading video from {}", video.artifact.url));
        let size = download(&self.http, &video.artifact.url, &video_path)
            .await
            .context("Video download failed")?;
        if size == 0 {
            let _ = tokio::fs::remove_file(&video_path).await;
            anyhow::bail!("Video download from {} was empty", video.artifact.url);
        }

        info!(
            "Shot finished in {} ({} bytes)",
            ctx.work_dir.display(),
            size
        );
        Ok(video_path)
    }
}

/// Brief, style and requirement joined into one generation prompt
pub fn compose_prompt(request: &JobRequest, brief: &str) -> String {
    let mut parts = vec![brief.trim().to_string()];

    let style = request.style.trim();
    if !style.is_empty() {
        parts.push(format!("Style: {}", style));
    }

    let requirement = request.user_requirement.trim();
    if !requirement.is_empty() {
        parts.push(format!("Requirements: {}", requirement));
    }

    parts.join(". ")
}
