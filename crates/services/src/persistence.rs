use std::sync::Arc;

use assessment_core::SessionState;
use storage::repository::SnapshotRepository;
use storage::snapshot::{SNAPSHOT_KEY, SnapshotRecord};

/// Best-effort snapshot persistence for a single quiz session.
///
/// Nothing here returns an error: a failed load reads as "no snapshot" and a
/// failed save or clear is logged and skipped. The in-memory session stays the
/// source of truth either way.
#[derive(Clone)]
pub struct SnapshotStore {
    repo: Arc<dyn SnapshotRepository>,
    key: String,
}

impl SnapshotStore {
    #[must_use]
    pub fn new(repo: Arc<dyn SnapshotRepository>) -> Self {
        Self::with_key(repo, SNAPSHOT_KEY)
    }

    #[must_use]
    pub fn with_key(repo: Arc<dyn SnapshotRepository>, key: impl Into<String>) -> Self {
        Self {
            repo,
            key: key.into(),
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the stored state, if any. Missing fields are back-filled; the
    /// result still needs `Quiz::restore` before use.
    pub async fn load(&self) -> Option<SessionState> {
        let payload = match self.repo.load_snapshot(&self.key).await {
            Ok(Some(payload)) => payload,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "snapshot load failed");
                return None;
            }
        };
        match SnapshotRecord::decode(&payload) {
            Ok(record) => Some(record.into_state()),
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "discarding unreadable snapshot");
                None
            }
        }
    }

    pub async fn save(&self, state: &SessionState) {
        let payload = match SnapshotRecord::from_state(state).encode() {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "snapshot encode failed");
                return;
            }
        };
        if let Err(err) = self.repo.save_snapshot(&self.key, &payload).await {
            tracing::warn!(key = %self.key, error = %err, "snapshot save skipped");
        }
    }

    pub async fn clear(&self) {
        if let Err(err) = self.repo.clear_snapshot(&self.key).await {
            tracing::warn!(key = %self.key, error = %err, "snapshot clear failed");
        }
    }
}
