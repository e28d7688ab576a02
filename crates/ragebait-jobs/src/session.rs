//! Session history persisted as a JSON file.
//!
//! Newest first. The file is rewritten wholesale on every change; there is
//! no versioning. Losing the history is harmless, so read and write
//! failures are logged and otherwise ignored by the mutating calls.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use ragebait_models::Session;

use crate::error::JobResult;

/// File name used inside the data directory.
pub const SESSIONS_FILE_NAME: &str = "ragebait_sessions.json";

#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    sessions: Vec<Session>,
}

impl SessionStore {
    /// Load the history at `path`. A missing or unreadable file yields an
    /// empty history.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let sessions = match std::fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<Vec<Session>>(&bytes) {
                Ok(sessions) => sessions,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Ignoring corrupt session history");
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read session history");
                Vec::new()
            }
        };
        debug!(path = %path.display(), count = sessions.len(), "Session history loaded");
        Self { path, sessions }
    }

    /// Load [`SESSIONS_FILE_NAME`] from `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::load(dir.as_ref().join(SESSIONS_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn list(&self) -> &[Session] {
        &self.sessions
    }

    pub fn get(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    /// Record a session at the top of the list.
    ///
    /// An existing entry with the same id is replaced.
    pub fn add(&mut self, id: impl Into<String>, title: impl Into<String>) -> Session {
        let session = Session::new(id, title);
        self.sessions.retain(|s| s.id != session.id);
        self.sessions.insert(0, session.clone());
        self.persist();
        session
    }

    pub fn set_thumbnail(&mut self, id: &str, thumbnail: impl Into<String>) -> bool {
        match self.sessions.iter_mut().find(|s| s.id == id) {
            Some(session) => {
                session.thumbnail = Some(thumbnail.into());
                self.persist();
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.id != id);
        let removed = self.sessions.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    /// Write the history to disk via a temporary file and rename.
    pub fn save(&self) -> JobResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_vec_pretty(&self.sessions)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            warn!(path = %self.path.display(), error = %e, "Failed to save session history");
        }
    }
}
