//! Job layer configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Polling cadence and budget.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay between resolves
    pub interval: Duration,
    /// Resolves before giving up (~10 minutes at the default interval)
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3),
            max_attempts: 200,
        }
    }
}

/// Job layer configuration.
#[derive(Debug, Clone)]
pub struct JobsConfig {
    /// Wall-clock budget for one generation request
    pub generation_timeout: Duration,
    /// Poll driver settings
    pub poll: PollConfig,
    /// Probe the backend with unrecognised ids as if they were video ids
    pub raw_id_probe: bool,
    /// Directory holding the session history file
    pub data_dir: PathBuf,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            generation_timeout: Duration::from_secs(600), // 10 minutes
            poll: PollConfig::default(),
            raw_id_probe: true,
            data_dir: default_data_dir(),
        }
    }
}

impl JobsConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            generation_timeout: Duration::from_secs(
                std::env::var("RAGEBAIT_GENERATION_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(600),
            ),
            poll: PollConfig {
                interval: Duration::from_millis(
                    std::env::var("RAGEBAIT_POLL_INTERVAL_MS")
                        .ok()
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(3000),
                ),
                max_attempts: std::env::var("RAGEBAIT_POLL_MAX_ATTEMPTS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(200),
            },
            raw_id_probe: std::env::var("RAGEBAIT_RAW_ID_PROBE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
            data_dir: std::env::var("RAGEBAIT_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_data_dir()),
        }
    }
}

fn default_data_dir() -> PathBuf {
    std::env::var("HOME")
        .map(|home| PathBuf::from(home).join(".ragebait"))
        .unwrap_or_else(|_| PathBuf::from(".ragebait"))
}
