//! Log stream command

use anyhow::{Context, Result};
use colored::*;

use crate::api::{ApiClient, EventDecoder};
use crate::output::print_log_line;

/// Print progress lines as the orchestrator publishes them
///
/// Heartbeats are skipped. With `until_idle` the stream is closed on the first
/// heartbeat seen while no job is running; otherwise it runs until the server
/// goes away or the user interrupts.
pub async fn follow_logs(client: &ApiClient, until_idle: bool) -> Result<()> {
    let mut response = client.open_log_stream().await?;
    let mut decoder = EventDecoder::new();

    println!("{}", "Following logs (Ctrl-C to stop)".dimmed());
    println!("{}", "─".repeat(80).dimmed());

    while let Some(chunk) = response
        .chunk()
        .await
        .context("Log stream interrupted")?
    {
        for frame in decoder.feed(&chunk) {
            if !frame.is_heartbeat() {
                print_log_line(&frame.log);
                continue;
            }

            if until_idle && !client.task_status().await?.running {
                println!("{}", "─".repeat(80).dimmed());
                return Ok(());
            }
        }
    }

    println!("{}", "Log stream closed by server".yellow());
    Ok(())
}
