//! Client-issued job identifiers.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Prefix shared by every locally allocated job id.
pub const JOB_ID_PREFIX: &str = "job_";

/// Unique identifier for a roast job.
///
/// Locally allocated ids look like `job_1718000000000`, but any string is
/// accepted so that backend video ids and bookmarked handles can be
/// resolved through the same API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for JobId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn unix_millis() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

/// Allocates time-based job ids that never repeat within a process.
///
/// The numeric part is the wall clock in milliseconds, bumped past the last
/// issued value whenever two calls land on the same millisecond or the
/// clock goes backwards.
pub struct JobIdAllocator {
    last: AtomicU64,
    clock: fn() -> u64,
}

impl JobIdAllocator {
    /// Allocator driven by the system clock.
    pub fn new() -> Self {
        Self::with_clock(unix_millis)
    }

    /// Allocator driven by a custom millisecond clock.
    pub fn with_clock(clock: fn() -> u64) -> Self {
        Self {
            last: AtomicU64::new(0),
            clock,
        }
    }

    /// Issue the next id.
    pub fn next(&self) -> JobId {
        let now = (self.clock)();
        let mut current = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = if now > current { now } else { current + 1 };
            match self.last.compare_exchange_weak(
                current,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return JobId(format!("{}{}", JOB_ID_PREFIX, candidate)),
                Err(actual) => current = actual,
            }
        }
    }
}

impl Default for JobIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for JobIdAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobIdAllocator")
            .field("last", &self.last.load(Ordering::Relaxed))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_fixed_clock_ids_are_sequential() {
        let ids = JobIdAllocator::with_clock(|| 1000);
        assert_eq!(ids.next().as_str(), "job_1000");
        assert_eq!(ids.next().as_str(), "job_1001");
        assert_eq!(ids.next().as_str(), "job_1002");
    }

    #[test]
    fn test_system_clock_ids_are_unique() {
        let ids = JobIdAllocator::new();
        let issued: HashSet<JobId> = (0..1000).map(|_| ids.next()).collect();
        assert_eq!(issued.len(), 1000);
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let json = serde_json::to_string(&JobId::from("job_42")).unwrap();
        assert_eq!(json, "\"job_42\"");
    }
}
