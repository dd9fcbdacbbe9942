//! Workspace command handlers

use anyhow::Result;
use chrono::Local;
use colored::*;

use crate::api::ApiClient;
use crate::output::{colorize_status, format_size};

/// List all workspaces, newest first
pub async fn list_workspaces(client: &ApiClient) -> Result<()> {
    let list = client.list_workspaces().await?;

    if list.work_dirs.is_empty() {
        println!("{}", "No workspaces found.".yellow());
        return Ok(());
    }

    println!(
        "{}",
        format!("Found {} workspace(s):", list.work_dirs.len()).bold()
    );
    println!();
    for workspace in list.work_dirs {
        let video = if workspace.has_video {
            "✓".green()
        } else {
            "✗".dimmed()
        };

        println!("  {} {}", "▸".cyan(), workspace.name.bold());
        println!("    Path:     {}", workspace.path.dimmed());
        println!("    Video:    {}", video);
        if let Some(status) = &workspace.status {
            println!("    Status:   {}", colorize_status(status));
        }
        if let Some(created) = workspace.created {
            println!(
                "    Created:  {}",
                created
                    .with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string()
                    .dimmed()
            );
        }
        println!();
    }

    Ok(())
}

/// Show file statistics for one workspace
pub async fn show_stats(client: &ApiClient, work_dir: &str) -> Result<()> {
    let stats = client.workspace_stats(work_dir).await?;

    println!("{}", format!("Workspace {}", work_dir).bold());
    println!("  Files:      {}", stats.total_files);
    println!("  Total size: {}", format_size(stats.total_size));

    if stats.main_files.is_empty() {
        println!("\n{}", "No generated files yet.".yellow());
        return Ok(());
    }

    println!("\n{}", "Generated files:".bold());
    for (name, info) in &stats.main_files {
        let modified = info
            .modified
            .map(|m| m.with_timezone(&Local).format("%H:%M:%S").to_string())
            .unwrap_or_default();
        println!(
            "  {:<18} {:>10}  {}",
            name.cyan(),
            format_size(info.size),
            modified.dimmed()
        );
    }

    Ok(())
}
