//! Per-session "already done" markers.

use super::StateError;
use super::rate::ensure_dir;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

/// Records which sessions have already run a once-per-session action.
pub trait SessionStore {
    fn is_done(&self, session_id: &str) -> Result<bool, StateError>;
    fn mark_done(&self, session_id: &str) -> Result<(), StateError>;
}

/// Marker files `<dir>/<session>.done`, so the record survives across processes.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn marker(&self, session_id: &str) -> PathBuf {
        self.dir.join(format!("{}.done", sanitize(session_id)))
    }
}

/// Keep ids usable as file names.
fn sanitize(session_id: &str) -> String {
    let cleaned: String = session_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() { "default".to_string() } else { cleaned }
}

impl SessionStore for FileSessionStore {
    fn is_done(&self, session_id: &str) -> Result<bool, StateError> {
        Ok(self.marker(session_id).exists())
    }

    fn mark_done(&self, session_id: &str) -> Result<(), StateError> {
        ensure_dir(&self.dir)?;
        let path = self.marker(session_id);
        fs::write(&path, b"").map_err(|source| StateError::Write { path, source })
    }
}

/// Process-lifetime store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    done: Mutex<HashSet<String>>,
}

impl SessionStore for MemorySessionStore {
    fn is_done(&self, session_id: &str) -> Result<bool, StateError> {
        let done = self.done.lock().map_err(|_| StateError::Poisoned)?;
        Ok(done.contains(session_id))
    }

    fn mark_done(&self, session_id: &str) -> Result<(), StateError> {
        let mut done = self.done.lock().map_err(|_| StateError::Poisoned)?;
        done.insert(session_id.to_string());
        Ok(())
    }
}
