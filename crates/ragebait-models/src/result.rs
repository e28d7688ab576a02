//! Materialized roast results.
//!
//! A [`RoastResult`] is what pollers see for a job: a `processing`
//! placeholder while generation runs, then a terminal record carrying
//! either the finished artifacts or an error message.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::job_status::JobStatus;

/// One line of the rendered commentary transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TranscriptLine {
    /// Segment start formatted as seconds with one decimal, e.g. `12.3s`
    pub timestamp: String,
    /// Commentary text
    pub text: String,
}

impl TranscriptLine {
    /// Build a line from a raw segment start time in seconds.
    pub fn from_start_time(start_time: f64, text: impl Into<String>) -> Self {
        Self {
            timestamp: format_timestamp(start_time),
            text: text.into(),
        }
    }
}

/// Format a segment start time with one decimal, e.g. `"12.3s"`.
///
/// Exact halves round away from zero (`1.25` becomes `"1.3s"`), the way
/// web clients render the same transcript. Everything else rounds to the
/// nearest tenth.
pub fn format_timestamp(seconds: f64) -> String {
    // A double sits exactly halfway between two tenths only when it is an
    // odd multiple of 0.25, and then `seconds * 10.0` is exact.
    let quarters = seconds * 4.0;
    if quarters.fract() == 0.0 && quarters % 2.0 != 0.0 {
        return format!("{:.1}s", (seconds * 10.0).round() / 10.0);
    }
    format!("{:.1}s", seconds)
}

/// Result payload for a roast job.
///
/// `video_url` is set only for completed jobs and `error` only for failed
/// ones. Meme fields are optional even on success.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct RoastResult {
    /// Job handle, or the backend video id once resolved
    pub job_id: String,
    /// Current status
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meme_url: Option<String>,
    /// Social caption that goes with the meme
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    /// Commentary transcript in playback order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<Vec<TranscriptLine>>,
    /// Video duration in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Lens identifier used for generation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lens: Option<String>,
    /// Human-readable failure reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RoastResult {
    /// Placeholder for a job that has not resolved yet.
    pub fn processing(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            status: JobStatus::Processing,
            ..Default::default()
        }
    }

    /// Completed result with the video location; other fields start empty.
    pub fn completed(job_id: impl Into<String>, video_url: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            status: JobStatus::Completed,
            video_url: Some(video_url.into()),
            ..Default::default()
        }
    }

    /// Failed result carrying an error message.
    pub fn failed(job_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            status: JobStatus::Failed,
            error: Some(error.into()),
            ..Default::default()
        }
    }

    /// Whether no further transitions will occur.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Replace the meme fields, leaving everything else untouched.
    pub fn apply_meme(&mut self, meme_url: impl Into<String>, caption: impl Into<String>) {
        self.meme_url = Some(meme_url.into());
        self.caption = Some(caption.into());
    }

    /// Check the status/field invariants.
    pub fn is_consistent(&self) -> bool {
        let has_video = self.video_url.is_some();
        let has_error = self.error.is_some();
        match self.status {
            JobStatus::Processing => !has_video && !has_error,
            JobStatus::Completed => has_video && !has_error,
            JobStatus::Failed => !has_video && has_error,
        }
    }
}
