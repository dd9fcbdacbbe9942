//! Job Registry
//!
//! In-memory store of job records keyed by job id. Reads hand out clones
//! taken under the lock, so callers never observe a half-updated record.

use chrono::Utc;
use reel_core::domain::job::{JobRecord, JobStatus};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};

#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: RwLock<HashMap<String, JobRecord>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a record
    pub fn insert(&self, record: JobRecord) {
        self.jobs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(record.id.clone(), record);
    }

    pub fn get(&self, id: &str) -> Option<JobRecord> {
        self.jobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// All records, most recently started first
    pub fn list(&self) -> Vec<JobRecord> {
        let mut jobs: Vec<JobRecord> = self
            .jobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        jobs
    }

    /// Marks a job Completed with its artifact
    ///
    /// Returns false when the id is unknown.
    pub fn complete(&self, id: &str, artifact: PathBuf) -> bool {
        self.update(id, |record| {
            record.status = JobStatus::Completed;
            record.artifact = Some(artifact);
        })
    }

    /// Marks a job Failed with the error text
    pub fn fail(&self, id: &str, error: impl Into<String>) -> bool {
        let error = error.into();
        self.update(id, |record| {
            record.status = JobStatus::Failed;
            record.error = Some(error);
        })
    }

    fn update(&self, id: &str, apply: impl FnOnce(&mut JobRecord)) -> bool {
        let mut jobs = self.jobs.write().unwrap_or_else(PoisonError::into_inner);
        match jobs.get_mut(id) {
            Some(record) => {
                apply(record);
                record.finished_at = Some(Utc::now());
                true
            }
            None => false,
        }
    }
}
