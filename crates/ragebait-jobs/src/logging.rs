//! Structured logging for roast generation jobs.
//!
//! Every event carries the job id and the lens it was submitted with. Once
//! the backend has named the video, its id is attached to later events and
//! recorded on the job span, so one clip can be followed from upload to
//! the finished roast.

use std::fmt;
use std::time::Duration;

use tracing::field::Empty;
use tracing::{error, info, warn, Span};

use ragebait_models::JobId;

/// Job logger for structured logging with consistent fields.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_id: String,
    lens: String,
    video_id: Option<String>,
    span: Span,
}

impl JobLogger {
    /// Create a logger and its `roast_job` span for one generation run.
    ///
    /// # Arguments
    /// * `job_id` - The client-issued job handle
    /// * `lens` - The comedy lens the clip was submitted with
    pub fn new(job_id: &JobId, lens: &str) -> Self {
        let span = tracing::info_span!(
            "roast_job",
            job_id = %job_id,
            lens = %lens,
            video_id = Empty
        );
        Self {
            job_id: job_id.to_string(),
            lens: lens.to_string(),
            video_id: None,
            span,
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn lens(&self) -> &str {
        &self.lens
    }

    /// Backend video id, once generation has produced one.
    pub fn video_id(&self) -> Option<&str> {
        self.video_id.as_deref()
    }

    /// The span the generation task runs in.
    pub fn span(&self) -> Span {
        self.span.clone()
    }

    /// Attach the backend video id to this job's events and span.
    pub fn attach_video_id(&mut self, video_id: &str) {
        self.span.record("video_id", video_id);
        self.video_id = Some(video_id.to_string());
    }

    fn video_field(&self) -> &str {
        self.video_id.as_deref().unwrap_or("-")
    }

    pub fn log_upload(&self, file_name: &str, bytes: usize) {
        info!(
            job_id = %self.job_id,
            lens = %self.lens,
            file = %file_name,
            bytes,
            "Uploading clip for roast"
        );
    }

    pub fn log_generated(&self, segments: usize) {
        info!(
            job_id = %self.job_id,
            lens = %self.lens,
            video_id = %self.video_field(),
            segments,
            "Roast video generated, requesting meme"
        );
    }

    /// The meme step failed; the job still completes without one.
    pub fn log_meme_skipped(&self, error: &dyn fmt::Display) {
        warn!(
            job_id = %self.job_id,
            lens = %self.lens,
            video_id = %self.video_field(),
            error = %error,
            "Meme generation failed, continuing without it"
        );
    }

    pub fn log_failure(&self, message: &str, reason: &str) {
        error!(
            job_id = %self.job_id,
            lens = %self.lens,
            reason = %reason,
            "Roast failed: {}", message
        );
    }

    pub fn log_completion(&self, with_meme: bool, elapsed: Duration) {
        info!(
            job_id = %self.job_id,
            lens = %self.lens,
            video_id = %self.video_field(),
            with_meme,
            elapsed_ms = elapsed.as_millis() as u64,
            "Roast completed"
        );
    }

    /// The store refused the final record.
    pub fn log_rejected(&self, error: &dyn fmt::Display) {
        warn!(
            job_id = %self.job_id,
            lens = %self.lens,
            video_id = %self.video_field(),
            error = %error,
            "Store rejected job result"
        );
    }
}
