//! Job layer error types.

use ragebait_client::ApiError;
use ragebait_models::JobStatus;
use thiserror::Error;

pub type JobResult<T> = Result<T, JobError>;

#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A resolved job was asked to resolve again with a different outcome.
    #[error("Job {job_id} is already {current}")]
    TerminalConflict { job_id: String, current: JobStatus },

    /// A terminal record is missing the field its status requires.
    #[error("Refusing inconsistent {status} result for job {job_id}")]
    InconsistentResult { job_id: String, status: JobStatus },

    #[error("Unknown job: {0}")]
    UnknownJob(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl JobError {
    pub fn unknown_job(job_id: impl Into<String>) -> Self {
        Self::UnknownJob(job_id.into())
    }

    pub fn terminal_conflict(job_id: impl Into<String>, current: JobStatus) -> Self {
        Self::TerminalConflict {
            job_id: job_id.into(),
            current,
        }
    }

    pub fn inconsistent_result(job_id: impl Into<String>, status: JobStatus) -> Self {
        Self::InconsistentResult {
            job_id: job_id.into(),
            status,
        }
    }
}
