use anyhow::{Context, Result};
use reel_client::{
    ArtifactStore, ImageClient, MinIntervalLimiter, NanoBananaProtocol, RateLimiter,
    Sora2Protocol, VideoClient,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reel_orchestrator::Config;
use reel_orchestrator::api::{self, AppState};
use reel_orchestrator::pipeline::ShotPipeline;
use reel_orchestrator::service::{JobOrchestrator, LogBus};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "reel_orchestrator=debug,reel_client=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Reel Orchestrator...");

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    if config.api_key.is_empty() {
        tracing::warn!("REEL_API_KEY is not set, vendor requests will be rejected");
    }

    let log_bus = Arc::new(LogBus::new());
    let limiter: Arc<dyn RateLimiter> =
        Arc::new(MinIntervalLimiter::new(config.min_request_interval));

    // Generation clients share the limiter and narrate to the log bus
    let image_client = ImageClient::new(
        NanoBananaProtocol::new(config.image_base_url.clone(), config.api_key.clone()),
        config.image_poll,
    )
    .with_rate_limiter(Arc::clone(&limiter))
    .with_store(ArtifactStore::new(config.artifact_dir.clone()))
    .with_sink(log_bus.clone());

    let video_client = VideoClient::new(
        Sora2Protocol::new(config.video_base_url.clone(), config.api_key.clone()),
        config.video_poll,
    )
    .with_rate_limiter(limiter)
    .with_sink(log_bus.clone());

    let pipeline = Arc::new(ShotPipeline::new(
        Arc::new(image_client),
        Arc::new(video_client),
    ));

    let orchestrator = Arc::new(JobOrchestrator::new(
        config.workspace_root.clone(),
        pipeline,
        log_bus,
    ));

    tracing::info!(
        "Workspaces under {}",
        orchestrator.workspace_root().display()
    );

    // Build router with all API endpoints
    let app = api::create_router(AppState::new(orchestrator, config.log_poll_timeout));

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
