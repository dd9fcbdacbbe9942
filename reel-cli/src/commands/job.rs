//! Job command handlers
//!
//! Starting jobs on the orchestrator and reading their state.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;
use colored::*;
use reel_core::domain::job::{JobRecord, JobRequest};
use reel_core::dto::job::StartJob;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::api::ApiClient;
use crate::commands::logs;
use crate::output::colorize_status;

/// Arguments of `reel start`
#[derive(Args, Debug, Default)]
pub struct StartArgs {
    /// Story idea to turn into a video
    #[arg(short, long)]
    pub idea: Option<String>,

    /// Ready-made script, used instead of an idea
    #[arg(short, long)]
    pub script: Option<String>,

    /// Visual style, e.g. "warm watercolor"
    #[arg(long)]
    pub style: Option<String>,

    /// Extra requirements for the shot
    #[arg(short = 'r', long = "requirement")]
    pub requirement: Option<String>,

    /// Workspace to use; a fresh one is created when omitted
    #[arg(short, long)]
    pub work_dir: Option<String>,

    /// TOML file with idea/script, style, user_requirement and work_dir
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Follow the log stream until the job finishes
    #[arg(long)]
    pub follow: bool,
}

/// Job description read from `--file`
#[derive(Debug, Default, Deserialize)]
struct JobFile {
    idea: Option<String>,
    script: Option<String>,
    #[serde(default)]
    style: String,
    #[serde(default)]
    user_requirement: String,
    work_dir: Option<String>,
}

fn load_job_file(path: &Path) -> Result<JobFile> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read job file {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("Failed to parse job file {}", path.display()))
}

/// Merges flags over the optional job file; flags win
fn build_start_request(args: &StartArgs, file: JobFile) -> Result<StartJob> {
    let request = JobRequest {
        idea: args.idea.clone().or(file.idea),
        script: args.script.clone().or(file.script),
        user_requirement: args.requirement.clone().unwrap_or(file.user_requirement),
        style: args.style.clone().unwrap_or(file.style),
    };

    if request.brief().is_none() {
        anyhow::bail!("Nothing to generate: pass --idea, --script or a --file that sets one");
    }

    Ok(StartJob {
        request,
        work_dir: args.work_dir.clone().or(file.work_dir),
    })
}

/// Start a job, optionally following its progress
pub async fn start_job(client: &ApiClient, args: StartArgs) -> Result<()> {
    let file = match &args.file {
        Some(path) => load_job_file(path)?,
        None => JobFile::default(),
    };
    let req = build_start_request(&args, file)?;

    let response = client.start_job(&req).await?;

    println!("{}", format!("✓ {}", response.message).green());
    if let Some(id) = &response.job_id {
        println!("  Job ID:    {}", id.cyan());
    }
    if let Some(dir) = &response.work_dir {
        println!("  Workspace: {}", dir.dimmed());
    }

    if args.follow {
        println!();
        logs::follow_logs(client, true).await?;
        if let Some(id) = &response.job_id {
            println!();
            print_job_details(&client.get_job(id).await?);
        }
    }

    Ok(())
}

/// Show whether a job is running
pub async fn show_status(client: &ApiClient) -> Result<()> {
    let status = client.task_status().await?;

    if status.running {
        println!("{}", "● A job is running".cyan());
    } else {
        println!("{}", "○ Idle".dimmed());
    }
    if let Some(dir) = status.working_dir {
        println!("  Workspace: {}", dir);
    }

    Ok(())
}

/// Get and display a single job
pub async fn get_job(client: &ApiClient, id: &str) -> Result<()> {
    let job = client.get_job(id).await?;
    print_job_details(&job);
    Ok(())
}

/// List all jobs
pub async fn list_jobs(client: &ApiClient) -> Result<()> {
    let jobs = client.list_jobs().await?;

    if jobs.is_empty() {
        println!("{}", "No jobs found.".yellow());
    } else {
        println!("{}", format!("Found {} job(s):", jobs.len()).bold());
        println!();
        for job in jobs {
            print_job_summary(&job);
        }
    }

    Ok(())
}

fn print_job_summary(job: &JobRecord) {
    println!("  {} Job {}", "▸".cyan(), job.id.bold());
    println!("    Status:   {}", colorize_status(&job.status));
    println!(
        "    Started:  {}",
        job.started_at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .dimmed()
    );
    if let Some(brief) = job.request.brief() {
        println!("    Brief:    {}", preview(brief, 60));
    }
    println!();
}

/// Print detailed job information
fn print_job_details(job: &JobRecord) {
    println!("{}", "Job Details:".bold());
    println!("  ID:          {}", job.id.cyan());
    println!("  Workspace:   {}", job.work_dir.display().to_string().dimmed());
    println!("  Status:      {}", colorize_status(&job.status));
    println!(
        "  Started:     {}",
        job.started_at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
    );

    if let Some(finished) = job.finished_at {
        println!(
            "  Finished:    {}",
            finished.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
        );
        let seconds = finished.signed_duration_since(job.started_at).num_seconds();
        println!("  Duration:    {}s", seconds);
    }

    println!("\n{}", "Request:".bold());
    if let Some(script) = &job.request.script {
        println!("  {} = {}", "script".cyan(), preview(script, 120));
    }
    if let Some(idea) = &job.request.idea {
        println!("  {} = {}", "idea".cyan(), idea);
    }
    if !job.request.style.is_empty() {
        println!("  {} = {}", "style".cyan(), job.request.style);
    }
    if !job.request.user_requirement.is_empty() {
        println!(
            "  {} = {}",
            "requirement".cyan(),
            job.request.user_requirement
        );
    }

    if let Some(artifact) = &job.artifact {
        println!("\n{}", "Output:".bold());
        println!("  {}", artifact.display().to_string().green());
    }

    if let Some(error) = &job.error {
        println!("\n{}", "Error:".bold());
        println!("{}", error.red());
    }
}

/// First `max_chars` characters of `text` on one line
fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > max_chars {
        format!("{}...", flat.chars().take(max_chars).collect::<String>())
    } else {
        flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_request_from_flags() {
        let args = StartArgs {
            idea: Some("cat and tiger explore a forest".to_string()),
            style: Some("warm".to_string()),
            ..Default::default()
        };

        let req = build_start_request(&args, JobFile::default()).unwrap();

        assert_eq!(
            req.request.idea.as_deref(),
            Some("cat and tiger explore a forest")
        );
        assert_eq!(req.request.style, "warm");
        assert_eq!(req.request.user_requirement, "");
        assert!(req.work_dir.is_none());
    }

    #[test]
    fn test_flags_override_job_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.toml");
        std::fs::write(
            &path,
            r#"
script = "EXT. FOREST - DAY. A cat meets a tiger."
style = "ink wash"
user_requirement = "no dialogue"
work_dir = "forest"
"#,
        )
        .unwrap();

        let args = StartArgs {
            style: Some("warm".to_string()),
            ..Default::default()
        };
        let req = build_start_request(&args, load_job_file(&path).unwrap()).unwrap();

        assert_eq!(
            req.request.brief(),
            Some("EXT. FOREST - DAY. A cat meets a tiger.")
        );
        assert_eq!(req.request.style, "warm");
        assert_eq!(req.request.user_requirement, "no dialogue");
        assert_eq!(req.work_dir.as_deref(), Some("forest"));
    }

    #[test]
    fn test_request_without_brief_is_rejected() {
        let args = StartArgs {
            idea: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(build_start_request(&args, JobFile::default()).is_err());
    }

    #[test]
    fn test_invalid_job_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "idea = ").unwrap();

        let err = load_job_file(&path).unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn test_preview_flattens_and_truncates() {
        assert_eq!(preview("a\n  b", 10), "a b");
        assert_eq!(preview("abcdef", 3), "abc...");
    }
}
