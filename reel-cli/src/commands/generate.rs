//! Direct generation commands
//!
//! Runs one image or video generation against the vendor services with the
//! same client the orchestrator uses, narrating progress to stdout.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use reel_client::vendor::{download, image, video};
use reel_client::{
    ArtifactStore, GenerationError, ImageClient, NanoBananaProtocol, PollSettings, Sora2Protocol,
    VideoClient,
};
use reel_core::domain::generation::{DEFAULT_ASPECT_RATIO, GenerationRequest};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::output::ConsoleSink;

/// Generate subcommands
#[derive(Subcommand)]
pub enum GenerateCommands {
    /// Generate a still image
    Image {
        /// What to draw
        #[arg(short, long)]
        prompt: String,

        #[arg(long, default_value = DEFAULT_ASPECT_RATIO)]
        aspect_ratio: String,

        /// Where generated images are saved
        #[arg(short, long, default_value = "generated_images")]
        out_dir: PathBuf,

        #[arg(long, env = "REEL_IMAGE_BASE_URL", default_value = image::DEFAULT_BASE_URL)]
        base_url: String,

        /// Seconds between status polls
        #[arg(long, default_value = "5")]
        poll_interval: u64,

        #[arg(long, default_value = "60")]
        max_polls: u32,
    },
    /// Generate a video clip
    Video {
        /// What to film
        #[arg(short, long)]
        prompt: String,

        #[arg(long, default_value = DEFAULT_ASPECT_RATIO)]
        aspect_ratio: String,

        /// Clip length in seconds
        #[arg(long, default_value = "10")]
        duration: String,

        /// Vendor size class
        #[arg(long, default_value = "small")]
        size: String,

        /// Reference image URL (repeatable)
        #[arg(long = "image")]
        images: Vec<String>,

        /// Previous generation to continue from
        #[arg(long)]
        remix_target: Option<String>,

        /// Download the finished clip to this path
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long, env = "REEL_VIDEO_BASE_URL", default_value = video::DEFAULT_BASE_URL)]
        base_url: String,

        /// Seconds between status polls
        #[arg(long, default_value = "5")]
        poll_interval: u64,

        #[arg(long, default_value = "120")]
        max_polls: u32,
    },
}

/// Handle generate commands
pub async fn handle_generate_command(command: GenerateCommands, config: &Config) -> Result<()> {
    let api_key = config.require_api_key()?;

    match command {
        GenerateCommands::Image {
            prompt,
            aspect_ratio,
            out_dir,
            base_url,
            poll_interval,
            max_polls,
        } => {
            let client = ImageClient::new(
                NanoBananaProtocol::new(base_url, api_key),
                PollSettings::new(Duration::from_secs(poll_interval), max_polls),
            )
            .with_store(ArtifactStore::new(out_dir))
            .with_sink(Arc::new(ConsoleSink));

            let request = GenerationRequest::new(prompt).with_aspect_ratio(aspect_ratio);
            generate_image(&client, &request).await
        }
        GenerateCommands::Video {
            prompt,
            aspect_ratio,
            duration,
            size,
            images,
            remix_target,
            output,
            base_url,
            poll_interval,
            max_polls,
        } => {
            let client = VideoClient::new(
                Sora2Protocol::new(base_url, api_key),
                PollSettings::new(Duration::from_secs(poll_interval), max_polls),
            )
            .with_sink(Arc::new(ConsoleSink));

            let mut request = GenerationRequest::new(prompt)
                .with_aspect_ratio(aspect_ratio)
                .with_duration(duration)
                .with_size(size);
            for url in images {
                request = request.with_reference_image(url);
            }
            if let Some(target) = remix_target {
                request = request.with_remix_target(target);
            }

            generate_video(&client, &request, output).await
        }
    }
}

async fn generate_image(client: &ImageClient, request: &GenerationRequest) -> Result<()> {
    print_poll_budget(client.poll_settings());
    let generation = client
        .generate(request)
        .await
        .map_err(explain_failure)
        .context("Image generation failed")?;

    println!();
    println!("{}", "✓ Image generated".green().bold());
    print_generation_info(
        generation.task_id.as_deref(),
        generation.remediated,
        &generation.prompt,
    );
    if let Some(url) = generation.artifact.locator.as_deref() {
        println!("  URL:      {}", url);
    }
    match &generation.saved_path {
        Some(path) => println!("  Saved:    {}", path.display().to_string().cyan()),
        None => println!("  {}", "Local copy could not be written".yellow()),
    }

    Ok(())
}

async fn generate_video(
    client: &VideoClient,
    request: &GenerationRequest,
    output: Option<PathBuf>,
) -> Result<()> {
    print_poll_budget(client.poll_settings());
    let generation = client
        .generate(request)
        .await
        .map_err(explain_failure)
        .context("Video generation failed")?;

    println!();
    println!("{}", "✓ Video generated".green().bold());
    print_generation_info(
        generation.task_id.as_deref(),
        generation.remediated,
        &generation.prompt,
    );
    println!("  URL:      {}", generation.artifact.url);

    if let Some(dest) = output {
        let http = client.protocol().http();
        let bytes = download(http, &generation.artifact.url, &dest)
            .await
            .with_context(|| format!("Failed to download video to {}", dest.display()))?;
        println!(
            "  Saved:    {} ({} bytes)",
            dest.display().to_string().cyan(),
            bytes
        );
    }

    Ok(())
}

fn print_poll_budget(poll: PollSettings) {
    println!(
        "{}",
        format!(
            "Polling every {}s, giving up after {} attempts",
            poll.interval.as_secs(),
            poll.max_attempts
        )
        .dimmed()
    );
}

/// Adds a hint to rejections that survived the automatic prompt rewrite
fn explain_failure(err: GenerationError) -> anyhow::Error {
    if err.is_policy_rejection() {
        anyhow::Error::new(err)
            .context("The prompt was rejected by the content policy, try rephrasing it")
    } else {
        err.into()
    }
}

fn print_generation_info(task_id: Option<&str>, remediated: bool, prompt: &str) {
    println!("  Task:     {}", task_id.unwrap_or("direct").dimmed());
    if remediated {
        println!(
            "  {}",
            "Prompt was rewritten after a content-policy rejection".yellow()
        );
        println!("  Prompt:   {}", prompt);
    }
}
