//! Durable state behind small substitutable interfaces.
//!
//! Production hooks persist to files; tests use the in-memory stores.

mod rate;
mod session;

pub use rate::{FileRateStore, MemoryRateStore, RateStore};
pub use session::{FileSessionStore, MemorySessionStore, SessionStore};

use std::path::PathBuf;
use thiserror::Error;

/// Errors from reading or writing hook state.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to create state directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("state lock poisoned")]
    Poisoned,
}
