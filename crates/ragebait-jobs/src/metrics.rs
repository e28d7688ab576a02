//! Job layer metrics.
//!
//! Recorded through the `metrics` facade; nothing is exported unless the
//! host application installs a recorder.

use metrics::{counter, histogram};

/// Metric names as constants for consistency.
pub mod names {
    pub const JOBS_STARTED_TOTAL: &str = "ragebait_jobs_started_total";
    pub const JOBS_COMPLETED_TOTAL: &str = "ragebait_jobs_completed_total";
    pub const JOBS_FAILED_TOTAL: &str = "ragebait_jobs_failed_total";
    pub const MEMES_FAILED_TOTAL: &str = "ragebait_memes_failed_total";
    pub const PROBE_FAILURES_TOTAL: &str = "ragebait_probe_failures_total";
    pub const GENERATION_DURATION_SECONDS: &str = "ragebait_generation_duration_seconds";
    pub const POLL_ATTEMPTS: &str = "ragebait_poll_attempts";
}

pub fn record_job_started(lens: &str) {
    counter!(names::JOBS_STARTED_TOTAL, "lens" => lens.to_string()).increment(1);
}

pub fn record_job_completed(duration_secs: f64) {
    counter!(names::JOBS_COMPLETED_TOTAL).increment(1);
    histogram!(names::GENERATION_DURATION_SECONDS).record(duration_secs);
}

/// `reason` is one of `backend`, `timeout`, `cancelled`.
pub fn record_job_failed(reason: &'static str) {
    counter!(names::JOBS_FAILED_TOTAL, "reason" => reason).increment(1);
}

pub fn record_meme_failed() {
    counter!(names::MEMES_FAILED_TOTAL).increment(1);
}

pub fn record_probe_failure() {
    counter!(names::PROBE_FAILURES_TOTAL).increment(1);
}

pub fn record_poll_finished(attempts: u32, timed_out: bool) {
    let outcome = if timed_out { "timed_out" } else { "resolved" };
    histogram!(names::POLL_ATTEMPTS, "outcome" => outcome).record(attempts as f64);
}
