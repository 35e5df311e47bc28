//! Storage for rate limiter timestamps.

use super::StateError;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const STATE_FILE: &str = "rate-limiter.state";

/// Raw timestamp lines for one limiter instance.
pub trait RateStore {
    /// Stored lines, oldest first. A missing store reads as empty.
    fn load(&self) -> Result<Vec<String>, StateError>;

    /// Replace the stored lines.
    fn save(&self, lines: &[String]) -> Result<(), StateError>;
}

/// One timestamp per line in `<dir>/rate-limiter.state`.
#[derive(Debug, Clone)]
pub struct FileRateStore {
    dir: PathBuf,
}

impl FileRateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(STATE_FILE)
    }
}

impl RateStore for FileRateStore {
    fn load(&self) -> Result<Vec<String>, StateError> {
        let path = self.path();
        match fs::read_to_string(&path) {
            Ok(content) => Ok(content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from)
                .collect()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(source) => Err(StateError::Read { path, source }),
        }
    }

    fn save(&self, lines: &[String]) -> Result<(), StateError> {
        ensure_dir(&self.dir)?;
        let path = self.path();
        let mut content = lines.join("\n");
        content.push('\n');
        fs::write(&path, content).map_err(|source| StateError::Write { path, source })
    }
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryRateStore {
    lines: Mutex<Vec<String>>,
}

impl MemoryRateStore {
    pub fn with_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: Mutex::new(lines.into_iter().map(Into::into).collect()),
        }
    }
}

impl RateStore for MemoryRateStore {
    fn load(&self) -> Result<Vec<String>, StateError> {
        self.lines
            .lock()
            .map(|l| l.clone())
            .map_err(|_| StateError::Poisoned)
    }

    fn save(&self, lines: &[String]) -> Result<(), StateError> {
        let mut guard = self.lines.lock().map_err(|_| StateError::Poisoned)?;
        *guard = lines.to_vec();
        Ok(())
    }
}

pub(super) fn ensure_dir(dir: &Path) -> Result<(), StateError> {
    fs::create_dir_all(dir).map_err(|source| StateError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}
