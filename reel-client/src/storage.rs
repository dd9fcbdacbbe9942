//! Local copies of generated artifacts

use anyhow::Context;
use chrono::{DateTime, Local};
use std::path::PathBuf;
use tracing::debug;

use crate::protocol::Artifact;

/// Maximum number of prompt characters kept in a file name
const PROMPT_STEM_CHARS: usize = 30;

/// Directory that receives a copy of every encodable artifact
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Writes a copy of `artifact`
    ///
    /// Returns `Ok(None)` for artifacts that have no byte form.
    pub async fn save<A: Artifact>(
        &self,
        artifact: &A,
        task_id: &str,
        prompt: &str,
    ) -> anyhow::Result<Option<PathBuf>> {
        let Some(bytes) = artifact.encode()? else {
            return Ok(None);
        };

        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;

        let name = file_name(task_id, prompt, artifact.extension(), Local::now());
        let path = self.dir.join(name);

        tokio::fs::write(&path, &bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        debug!("Saved {} bytes to {}", bytes.len(), path.display());
        Ok(Some(path))
    }
}

/// `{task_id}_{YYYYmmdd_HHMMSS}_{safe_prompt}.{ext}`
pub fn file_name(task_id: &str, prompt: &str, extension: &str, now: DateTime<Local>) -> String {
    format!(
        "{}_{}_{}.{}",
        task_id,
        now.format("%Y%m%d_%H%M%S"),
        safe_prompt(prompt),
        extension
    )
}

fn safe_prompt(prompt: &str) -> String {
    let kept: String = prompt
        .chars()
        .take(PROMPT_STEM_CHARS)
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();

    let stem = kept.split_whitespace().collect::<Vec<_>>().join("_");
    if stem.is_empty() {
        "image".to_string()
    } else {
        stem
    }
}
