//! Reel CLI
//!
//! Command-line interface for the Reel orchestrator and for one-off
//! generations against the vendor services.

mod api;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "reel")]
#[command(about = "Reel video generation CLI", long_about = None)]
struct Cli {
    /// Orchestrator URL
    #[arg(long, env = "REEL_SERVER_URL", default_value = "http://localhost:5000")]
    server_url: String,

    /// Vendor API key, only needed by `generate`
    #[arg(long, env = "REEL_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Progress goes to stdout through the console sink; tracing only for warnings
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config {
        server_url: cli.server_url,
        api_key: cli.api_key.filter(|key| !key.trim().is_empty()),
    };

    handle_command(cli.command, &config).await
}
