//! Pluggable persistence backends for the report store.
//!
//! The persistence contract is deliberately small: the entire report list
//! is serialized as one JSON document and replaced wholesale on every
//! write. A backend only has to load and store that single payload — it
//! never patches individual records. This makes the whole-list write the
//! atomicity unit shared between contexts.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

/// File name of the persisted report list inside the data directory.
///
/// Namespaced to this application; nothing else writes to it.
pub const REPORTS_FILE: &str = "mw_reports.json";

/// Errors from a persistence backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Durable (or deliberately non-durable) storage for the serialized
/// report list.
///
/// Implementations must be safe to share across threads; the store calls
/// them from behind its own write lock, so calls never overlap.
pub trait StorageBackend: Send + Sync {
    /// Loads the persisted payload. `None` means nothing has been written
    /// yet — distinct from an unreadable payload, which is an error.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the medium exists but cannot be read.
    fn load(&self) -> Result<Option<String>, StorageError>;

    /// Replaces the persisted payload wholesale.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the payload cannot be written.
    fn store(&self, payload: &str) -> Result<(), StorageError>;
}

/// File-backed storage: one JSON document at a fixed path.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    /// Creates a backend writing to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a backend writing to [`REPORTS_FILE`] inside `data_dir`.
    #[must_use]
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::new(data_dir.as_ref().join(REPORTS_FILE))
    }

    /// The path this backend reads and writes.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageBackend for FileBackend {
    fn load(&self) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(payload) => Ok(Some(payload)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, payload: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, payload)?;
        Ok(())
    }
}

/// Process-local storage with no durability.
///
/// Used in tests and as the degraded mode when durable storage is
/// unavailable or disabled.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    payload: Mutex<Option<String>>,
}

impl MemoryBackend {
    /// Creates an empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend pre-seeded with a payload, as if a previous
    /// context had already written it.
    #[must_use]
    pub fn with_payload(payload: impl Into<String>) -> Self {
        Self {
            payload: Mutex::new(Some(payload.into())),
        }
    }
}

impl StorageBackend for MemoryBackend {
    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self
            .payload
            .lock()
            .expect("memory backend mutex poisoned")
            .clone())
    }

    fn store(&self, payload: &str) -> Result<(), StorageError> {
        *self
            .payload
            .lock()
            .expect("memory backend mutex poisoned") = Some(payload.to_string());
        Ok(())
    }
}
