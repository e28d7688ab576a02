//! Session history entries.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A previously started roast, kept for the history list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Session {
    /// Handle the result can be resolved with (job id or video id)
    pub id: String,
    /// Display title, usually `"<file name> - <lens>"`
    pub title: String,
    /// When the session was recorded
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl Session {
    /// Create a session stamped with the current time.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            date: Utc::now(),
            thumbnail: None,
        }
    }
}
