//! Workspace Service
//!
//! Read-only views over the job workspaces on disk.

use chrono::{DateTime, Utc};
use reel_core::dto::workspace::{FileInfo, WorkspaceStats, WorkspaceSummary};
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use crate::pipeline::{FINAL_VIDEO_FILE, KEYFRAME_FILE, PROMPT_FILE};
use crate::repository::JobRegistry;

/// Files reported individually by [`stats`]
const MAIN_FILES: &[&str] = &[
    "story.txt",
    "characters.json",
    "script.json",
    PROMPT_FILE,
    KEYFRAME_FILE,
    FINAL_VIDEO_FILE,
];

/// Resolves a caller-supplied workspace path against the root
///
/// Paths already under `root` are kept as they are; anything else is joined
/// onto it. Returns `None` for paths that would escape the root or that name
/// the root itself.
pub fn resolve(root: &Path, requested: &str) -> Option<PathBuf> {
    let requested = Path::new(requested.trim());
    if requested.as_os_str().is_empty() {
        return None;
    }

    let escapes = requested
        .components()
        .any(|c| matches!(c, Component::ParentDir));
    if escapes {
        return None;
    }

    let resolved = if requested.starts_with(root) {
        requested.to_path_buf()
    } else if requested.has_root() {
        return None;
    } else {
        root.join(requested)
    };

    let below_root = resolved
        .strip_prefix(root)
        .ok()?
        .components()
        .any(|c| matches!(c, Component::Normal(_)));
    below_root.then_some(resolved)
}

/// Every workspace directory under `root`, newest first
pub fn list(root: &Path, registry: &JobRegistry) -> Vec<WorkspaceSummary> {
    let Ok(entries) = std::fs::read_dir(root) else {
        return Vec::new();
    };

    let mut workspaces: Vec<WorkspaceSummary> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .map(|entry| {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            let created = entry
                .metadata()
                .ok()
                .and_then(|meta| meta.created().or_else(|_| meta.modified()).ok())
                .map(DateTime::<Utc>::from);

            WorkspaceSummary {
                has_video: path.join(FINAL_VIDEO_FILE).is_file(),
                status: registry.get(&name).map(|record| record.status),
                path: path.display().to_string(),
                name,
                created,
            }
        })
        .collect();

    workspaces.sort_by(|a, b| b.created.cmp(&a.created));
    workspaces
}

/// File counts and sizes for one workspace; zeros when it does not exist
pub fn stats(work_dir: &Path) -> WorkspaceStats {
    let mut stats = WorkspaceStats::default();
    if !work_dir.is_dir() {
        return stats;
    }

    for entry in WalkDir::new(work_dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
    {
        stats.total_files += 1;
        stats.total_size += entry.metadata().map(|meta| meta.len()).unwrap_or(0);
    }

    for name in MAIN_FILES {
        let Ok(meta) = std::fs::metadata(work_dir.join(name)) else {
            continue;
        };
        if meta.is_file() {
            stats.main_files.insert(
                name.to_string(),
                FileInfo {
                    size: meta.len(),
                    modified: meta.modified().ok().map(DateTime::<Utc>::from),
                },
            );
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use reel_core::domain::job::{JobRecord, JobRequest, JobStatus};

    #[test]
    fn test_resolve_joins_relative_names() {
        let root = Path::new("working_dir_idea2video");

        assert_eq!(
            resolve(root, "demo"),
            Some(PathBuf::from("working_dir_idea2video/demo"))
        );
        assert_eq!(
            resolve(root, "working_dir_idea2video/demo"),
            Some(PathBuf::from("working_dir_idea2video/demo"))
        );
    }

    #[test]
    fn test_resolve_rejects_escapes() {
        let root = Path::new("working_dir_idea2video");

        assert_eq!(resolve(root, "../etc"), None);
        assert_eq!(resolve(root, "/tmp/elsewhere"), None);
        assert_eq!(resolve(root, "   "), None);
    }

    #[test]
    fn test_resolve_rejects_the_root_itself() {
        let root = Path::new("working_dir_idea2video");

        assert_eq!(resolve(root, "working_dir_idea2video"), None);
        assert_eq!(resolve(root, "working_dir_idea2video/."), None);
        assert_eq!(resolve(root, "."), None);
        assert_eq!(
            resolve(root, "./demo"),
            Some(PathBuf::from("working_dir_idea2video/./demo"))
        );
    }

    #[test]
    fn test_stats_counts_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(PROMPT_FILE), "hello").unwrap();
        std::fs::write(dir.path().join(FINAL_VIDEO_FILE), vec![0u8; 64]).unwrap();
        std::fs::create_dir(dir.path().join("shots")).unwrap();
        std::fs::write(dir.path().join("shots/1.png"), vec![0u8; 10]).unwrap();

        let stats = stats(dir.path());

        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.total_size, 79);
        assert_eq!(stats.main_files.len(), 2);
        assert_eq!(stats.main_files[FINAL_VIDEO_FILE].size, 64);
        assert!(!stats.main_files.contains_key(KEYFRAME_FILE));
    }

    #[test]
    fn test_stats_missing_workspace_is_zero() {
        let dir = tempfile::tempdir().unwrap();
        let stats = stats(&dir.path().join("nope"));

        assert_eq!(stats.total_files, 0);
        assert_eq!(stats.total_size, 0);
        assert!(stats.main_files.is_empty());
    }

    #[test]
    fn test_list_reports_video_and_status() {
        let root = tempfile::tempdir().unwrap();
        let done = root.path().join("done");
        std::fs::create_dir(&done).unwrap();
        std::fs::write(done.join(FINAL_VIDEO_FILE), b"mp4").unwrap();
        std::fs::create_dir(root.path().join("fresh")).unwrap();
        std::fs::write(root.path().join("stray.txt"), b"not a workspace").unwrap();

        let registry = JobRegistry::new();
        registry.insert(JobRecord::running(
            "done",
            done.clone(),
            JobRequest::from_idea("idea", "warm"),
        ));
        registry.complete("done", done.join(FINAL_VIDEO_FILE));

        let mut listed = list(root.path(), &registry);
        listed.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].name, "done");
        assert!(listed[0].has_video);
        assert_eq!(listed[0].status, Some(JobStatus::Completed));
        assert_eq!(listed[1].name, "fresh");
        assert!(!listed[1].has_video);
        assert_eq!(listed[1].status, None);
    }
}
