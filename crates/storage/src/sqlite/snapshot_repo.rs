use chrono::Utc;
use sqlx::Row;

use super::SqliteRepository;
use crate::repository::{SnapshotRepository, StorageError};

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait::async_trait]
impl SnapshotRepository for SqliteRepository {
    async fn load_snapshot(&self, key: &str) -> Result<Option<String>, StorageError> {
        let row = sqlx::query("SELECT payload FROM quiz_snapshots WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.map(|row| {
            row.try_get::<String, _>("payload")
                .map_err(|e| StorageError::Serialization(e.to_string()))
        })
        .transpose()
    }

    async fn save_snapshot(&self, key: &str, payload: &str) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO quiz_snapshots (key, payload, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(key) DO UPDATE SET
                    payload = excluded.payload,
                    updated_at = excluded.updated_at
            ",
        )
        .bind(key)
        .bind(payload)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }

    async fn clear_snapshot(&self, key: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM quiz_snapshots WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(())
    }
}
