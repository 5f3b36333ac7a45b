//! Job-keyed progress registry
//!
//! Process-wide mapping from job identifier to the latest
//! `(stage, percentage)` tuple, written by the orchestrator and read by
//! the progress endpoints. Injected through `AppState` rather than held
//! as a module global so multiple pipelines can be tested in isolation.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Latest progress snapshot for one job
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobProgress {
    pub stage: String,
    /// 0-100, monotonically non-decreasing while the job is active
    pub progress: u8,
    /// Set only by the terminal success write
    pub analysis_id: Option<i64>,
    /// Set only by the terminal failure write
    pub error: Option<String>,
}

impl JobProgress {
    /// Terminal entries carry either a result identifier or a failure marker
    pub fn is_terminal(&self) -> bool {
        self.analysis_id.is_some() || self.error.is_some()
    }
}

/// Concurrent job-id → progress map
///
/// Clones share the same backing store. Writes for different jobs never
/// contend on the same key, but the map itself is safe for concurrent
/// insert/update/delete from any number of job tasks.
#[derive(Clone, Default)]
pub struct ProgressRegistry {
    inner: Arc<RwLock<HashMap<String, JobProgress>>>,
}

impl ProgressRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically claim a fresh job identifier with an initial entry
    ///
    /// Returns false when the identifier is already present. Check and
    /// insert happen under one write lock, so two concurrent claims for
    /// the same identifier cannot both succeed.
    pub fn try_insert(&self, job_id: &str, stage: &str) -> bool {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if map.contains_key(job_id) {
            return false;
        }
        map.insert(
            job_id.to_string(),
            JobProgress {
                stage: stage.to_string(),
                progress: 0,
                analysis_id: None,
                error: None,
            },
        );
        true
    }

    /// Record a progress update; percentages never move backwards
    pub fn update(&self, job_id: &str, stage: &str, progress: u8) {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let entry = map.entry(job_id.to_string()).or_insert_with(|| JobProgress {
            stage: stage.to_string(),
            progress: 0,
            analysis_id: None,
            error: None,
        });
        if entry.is_terminal() {
            return;
        }
        entry.stage = stage.to_string();
        entry.progress = entry.progress.max(progress.min(100));
    }

    /// Terminal success write: 100% plus the stored result identifier
    ///
    /// Callers must only invoke this after the result is retrievable, so
    /// a subscriber never observes 100% before the aggregate exists.
    pub fn complete(&self, job_id: &str, analysis_id: i64) {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        map.insert(
            job_id.to_string(),
            JobProgress {
                stage: "complete".to_string(),
                progress: 100,
                analysis_id: Some(analysis_id),
                error: None,
            },
        );
    }

    /// Terminal failure write
    pub fn fail(&self, job_id: &str, message: &str) {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let progress = map.get(job_id).map(|e| e.progress).unwrap_or(0);
        map.insert(
            job_id.to_string(),
            JobProgress {
                stage: "failed".to_string(),
                progress,
                analysis_id: None,
                error: Some(message.to_string()),
            },
        );
    }

    pub fn get(&self, job_id: &str) -> Option<JobProgress> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(job_id)
            .cloned()
    }

    /// Remove a job's entry once its terminal state has been observed
    pub fn remove(&self, job_id: &str) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(job_id);
    }
}
