//! In-process job registry and result cache.
//!
//! Holds two maps behind one lock:
//! - job id → latest [`RoastResult`] (the result cache)
//! - job id → backend video id (the registry's id mapping)
//!
//! The store is an ordinary value: create one per session or process and
//! share it through `Arc`. Readers get snapshot clones, so a poll never
//! sees a half-written record. The lock is never held across an `.await`.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::{debug, warn};

use ragebait_models::{JobStatus, RoastResult};

use crate::error::{JobError, JobResult};

#[derive(Default)]
struct StoreInner {
    results: HashMap<String, RoastResult>,
    video_ids: HashMap<String, String>,
}

/// Job registry and result cache.
#[derive(Default)]
pub struct JobStore {
    inner: RwLock<StoreInner>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a `processing` placeholder for a new job.
    ///
    /// Overwrites an in-flight entry with the same id. A resolved entry is
    /// left alone: status never moves back to `processing`.
    pub fn register(&self, job_id: &str) {
        let mut inner = self.inner.write();
        if let Some(existing) = inner.results.get(job_id) {
            if existing.is_terminal() {
                warn!(
                    job_id = %job_id,
                    status = %existing.status,
                    "Ignoring re-registration of resolved job"
                );
                return;
            }
        }
        inner
            .results
            .insert(job_id.to_string(), RoastResult::processing(job_id));
    }

    /// Snapshot of the cached result.
    pub fn get(&self, job_id: &str) -> Option<RoastResult> {
        self.inner.read().results.get(job_id).cloned()
    }

    /// Replace the record with a `completed` result.
    ///
    /// The result must carry a `video_url`.
    pub fn set_completed(&self, job_id: &str, mut result: RoastResult) -> JobResult<()> {
        result.status = JobStatus::Completed;
        result.error = None;
        self.set_terminal(job_id, result)
    }

    /// Replace the record with a `failed` result.
    pub fn set_failed(&self, job_id: &str, error: impl Into<String>) -> JobResult<()> {
        self.set_terminal(job_id, RoastResult::failed(job_id, error))
    }

    fn set_terminal(&self, job_id: &str, result: RoastResult) -> JobResult<()> {
        if !result.is_consistent() {
            warn!(job_id = %job_id, status = %result.status, "Rejecting inconsistent result");
            return Err(JobError::inconsistent_result(job_id, result.status));
        }

        let mut inner = self.inner.write();
        if let Some(existing) = inner.results.get(job_id) {
            if existing.is_terminal() && existing.status != result.status {
                return Err(JobError::terminal_conflict(job_id, existing.status));
            }
        }
        debug!(job_id = %job_id, status = %result.status, "Job resolved");
        inner.results.insert(job_id.to_string(), result);
        Ok(())
    }

    /// Remember which backend video a job produced.
    pub fn map_video_id(&self, job_id: &str, video_id: impl Into<String>) {
        self.inner
            .write()
            .video_ids
            .insert(job_id.to_string(), video_id.into());
    }

    pub fn video_id_for(&self, job_id: &str) -> Option<String> {
        self.inner.read().video_ids.get(job_id).cloned()
    }

    /// Update meme fields on every completed record produced by `video_id`.
    ///
    /// Only `meme_url` and `caption` change. Returns how many records were
    /// patched.
    pub fn patch_meme(&self, video_id: &str, meme_url: &str, caption: &str) -> usize {
        let mut guard = self.inner.write();
        let StoreInner { results, video_ids } = &mut *guard;

        let mut patched = 0;
        for (job_id, result) in results.iter_mut() {
            let belongs = result.job_id == video_id
                || video_ids.get(job_id).map(String::as_str) == Some(video_id);
            if belongs && result.status == JobStatus::Completed {
                result.apply_meme(meme_url, caption);
                patched += 1;
            }
        }
        patched
    }

    /// Drop the cached payload for a job.
    ///
    /// The video-id mapping is kept, so a later resolve re-probes the
    /// backend instead of reporting an unknown job.
    pub fn evict(&self, job_id: &str) -> Option<RoastResult> {
        self.inner.write().results.remove(job_id)
    }

    /// Number of cached results.
    pub fn len(&self) -> usize {
        self.inner.read().results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
