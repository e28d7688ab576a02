//! Job tracking and result resolution for roast generation.
//!
//! This crate provides:
//! - An injectable job registry and result cache
//! - A resolver that falls back from cache to backend probes
//! - A generation orchestrator that owns its background tasks
//! - A cancelable poll driver with an attempt budget
//! - Persisted session history

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod normalize;
pub mod orchestrator;
pub mod poll;
pub mod resolver;
pub mod session;
pub mod store;

pub use config::{JobsConfig, PollConfig};
pub use error::{JobError, JobResult};
pub use logging::JobLogger;
pub use normalize::GenerationOutcome;
pub use orchestrator::{RoastOrchestrator, CANCELLED_MESSAGE};
pub use poll::{PollDriver, PollHandle, PollOutcome, POLL_TIMEOUT_MESSAGE};
pub use resolver::{JobResolver, ResolveJob};
pub use session::{SessionStore, SESSIONS_FILE_NAME};
pub use store::JobStore;
