//! Local Storage Area using SQLite

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::{StorageArea, StoredValue},
};
use sqlx::{sqlite::SqlitePool, Row};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

/// SQLite-backed storage area implementation
///
/// Backs the device-local replica with a persistent key/value table:
/// - JSON values stored as text
/// - Async operations
/// - No quota enforcement (the local cache is treated as unbounded)
pub struct SqliteStorageArea {
    pool: SqlitePool,
}

impl SqliteStorageArea {
    /// Create a new storage area with the given database path
    pub async fn new(db_path: PathBuf) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(BridgeError::Io)?;
        }

        // Convert path to string, replacing backslashes with forward slashes for SQLite URL
        let path_str = db_path.to_string_lossy().replace('\\', "/");
        let db_url = format!("sqlite://{}?mode=rwc", path_str);

        let pool = SqlitePool::connect(&db_url)
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("Failed to connect to DB: {}", e)))?;

        Self::init_schema(&pool).await?;

        debug!(path = ?db_path, "Initialized local storage area");

        Ok(Self { pool })
    }

    /// Create an in-memory storage area (for testing)
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("Failed to connect to DB: {}", e)))?;

        Self::init_schema(&pool).await?;

        Ok(Self { pool })
    }

    async fn init_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS storage (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await
        .map_err(|e| BridgeError::OperationFailed(format!("Failed to create table: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl StorageArea for SqliteStorageArea {
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, StoredValue>> {
        let mut values = HashMap::new();

        for key in keys {
            let row = sqlx::query("SELECT value FROM storage WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| BridgeError::OperationFailed(format!("Failed to get key: {}", e)))?;

            if let Some(row) = row {
                let raw: String = row.get(0);
                let value: StoredValue = serde_json::from_str(&raw).map_err(|e| {
                    BridgeError::OperationFailed(format!("Corrupt value for {}: {}", key, e))
                })?;
                values.insert(key.to_string(), value);
            }
        }

        Ok(values)
    }

    async fn set(&self, items: HashMap<String, StoredValue>) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            BridgeError::OperationFailed(format!("Failed to begin transaction: {}", e))
        })?;

        for (key, value) in &items {
            let raw = serde_json::to_string(value)
                .map_err(|e| BridgeError::OperationFailed(format!("Serialize failed: {}", e)))?;

            sqlx::query(
                r#"
                INSERT INTO storage (key, value)
                VALUES (?, ?)
                ON CONFLICT(key) DO UPDATE SET value = excluded.value
                "#,
            )
            .bind(key)
            .bind(raw)
            .execute(&mut *tx)
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("Failed to set key: {}", e)))?;
        }

        tx.commit()
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("Failed to commit: {}", e)))?;

        debug!(count = items.len(), "Stored values");
        Ok(())
    }

    async fn remove(&self, keys: &[&str]) -> Result<()> {
        for key in keys {
            sqlx::query("DELETE FROM storage WHERE key = ?")
                .bind(key)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    BridgeError::OperationFailed(format!("Failed to delete key: {}", e))
                })?;
        }

        debug!(count = keys.len(), "Removed keys");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        sqlx::query("DELETE FROM storage")
            .execute(&self.pool)
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("Failed to clear area: {}", e)))?;

        debug!("Cleared storage area");
        Ok(())
    }

    async fn get_bytes_in_use(&self, keys: Option<&[&str]>) -> Result<u64> {
        match keys {
            Some(keys) => {
                let mut total = 0u64;
                for key in keys {
                    let row = sqlx::query("SELECT value FROM storage WHERE key = ?")
                        .bind(key)
                        .fetch_optional(&self.pool)
                        .await
                        .map_err(|e| {
                            BridgeError::OperationFailed(format!("Failed to get key: {}", e))
                        })?;

                    if let Some(row) = row {
                        let raw: String = row.get(0);
                        total += key.len() as u64 + raw.len() as u64;
                    }
                }
                Ok(total)
            }
            None => {
                let row = sqlx::query(
                    "SELECT COALESCE(SUM(LENGTH(key) + LENGTH(value)), 0) FROM storage",
                )
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    BridgeError::OperationFailed(format!("Failed to sum bytes: {}", e))
                })?;

                let total: i64 = row.get(0);
                Ok(total as u64)
            }
        }
    }
}
