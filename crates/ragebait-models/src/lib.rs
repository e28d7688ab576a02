//! Shared data models for the Ragebait client.
//!
//! This crate provides Serde-serializable types for:
//! - Job identifiers and status
//! - Roast results and transcripts
//! - Comedy lenses
//! - Session history entries

pub mod job;
pub mod job_status;
pub mod lens;
pub mod result;
pub mod session;

// Re-export common types
pub use job::{JobId, JobIdAllocator, JOB_ID_PREFIX};
pub use job_status::JobStatus;
pub use lens::{Lens, LensParseError};
pub use result::{format_timestamp, RoastResult, TranscriptLine};
pub use session::Session;
