//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod generate;
mod job;
mod logs;
mod workspace;

pub use generate::GenerateCommands;
pub use job::StartArgs;

use anyhow::Result;
use clap::Subcommand;

use crate::api::ApiClient;
use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start a generation job on the orchestrator
    Start(StartArgs),
    /// Show whether a job is running
    Status,
    /// Get job details
    Job {
        /// Job id (the workspace name)
        id: String,
    },
    /// List all jobs
    Jobs,
    /// Follow the live progress log
    Logs {
        /// Stop once no job is running
        #[arg(long)]
        until_idle: bool,
    },
    /// List workspaces
    Workspaces,
    /// Show file statistics for a workspace
    Stats {
        /// Workspace name or path
        work_dir: String,
    },
    /// Generate directly against the vendor services, bypassing the orchestrator
    Generate {
        #[command(subcommand)]
        command: GenerateCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    let client = ApiClient::new(&config.server_url);

    match command {
        Commands::Start(args) => job::start_job(&client, args).await,
        Commands::Status => job::show_status(&client).await,
        Commands::Job { id } => job::get_job(&client, &id).await,
        Commands::Jobs => job::list_jobs(&client).await,
        Commands::Logs { until_idle } => logs::follow_logs(&client, until_idle).await,
        Commands::Workspaces => workspace::list_workspaces(&client).await,
        Commands::Stats { work_dir } => workspace::show_stats(&client, &work_dir).await,
        Commands::Generate { command } => generate::handle_generate_command(command, config).await,
    }
}
