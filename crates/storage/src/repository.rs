use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Key-value contract for serialized quiz snapshots.
///
/// Payloads are opaque strings at this level; encoding lives in
/// [`crate::snapshot::SnapshotRecord`].
#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Fetch the payload stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn load_snapshot(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or replace the payload stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the payload cannot be stored.
    async fn save_snapshot(&self, key: &str, payload: &str) -> Result<(), StorageError>;

    /// Remove the payload stored under `key`. Removing a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn clear_snapshot(&self, key: &str) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
///
/// Can be switched into an "unavailable" mode where every call fails, which
/// mimics a storage backend that is disabled or out of quota.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    snapshots: Arc<Mutex<HashMap<String, String>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A repository whose every call fails with `StorageError::Connection`.
    #[must_use]
    pub fn unavailable() -> Self {
        let repo = Self::new();
        repo.set_unavailable(true);
        repo
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Connection("storage unavailable".into()));
        }
        self.snapshots
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl SnapshotRepository for InMemoryRepository {
    async fn load_snapshot(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self.guard()?;
        Ok(guard.get(key).cloned())
    }

    async fn save_snapshot(&self, key: &str, payload: &str) -> Result<(), StorageError> {
        let mut guard = self.guard()?;
        guard.insert(key.to_owned(), payload.to_owned());
        Ok(())
    }

    async fn clear_snapshot(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self.guard()?;
        guard.remove(key);
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub snapshots: Arc<dyn SnapshotRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let snapshots: Arc<dyn SnapshotRepository> = Arc::new(InMemoryRepository::new());
        Self { snapshots }
    }
}
