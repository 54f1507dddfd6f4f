//! In-Memory Storage Area
//!
//! Map-backed [`StorageArea`] used for the remote replica in tests and in
//! hosts that have no real cloud backend wired up. An optional quota mirrors
//! the limits of browser sync storage so quota failures can be exercised
//! without a network.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::{StorageArea, StoredValue},
};
use std::collections::HashMap;
use std::sync::Mutex;

/// Capacity limits enforced by [`MemoryStorageArea::with_quota`].
#[derive(Debug, Clone, Copy)]
pub struct QuotaConfig {
    /// Maximum bytes for a single entry (key length + JSON value length)
    pub max_item_bytes: u64,

    /// Maximum number of stored entries
    pub max_items: u64,

    /// Maximum total bytes across all entries
    pub max_total_bytes: u64,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        // Limits of chrome.storage.sync, the remote store this area stands in for.
        Self {
            max_item_bytes: 8_192,
            max_items: 512,
            max_total_bytes: 102_400,
        }
    }
}

/// In-memory storage area implementation
///
/// Thread-safe map of key to JSON value. With a [`QuotaConfig`] attached,
/// `set` rejects writes the way a quota-limited remote backend would.
#[derive(Default)]
pub struct MemoryStorageArea {
    entries: Mutex<HashMap<String, String>>,
    quota: Option<QuotaConfig>,
}

impl MemoryStorageArea {
    /// Create an unbounded in-memory area
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an area that enforces the given quota on every `set`
    pub fn with_quota(quota: QuotaConfig) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            quota: Some(quota),
        }
    }

    fn entry_bytes(key: &str, raw: &str) -> u64 {
        key.len() as u64 + raw.len() as u64
    }

    fn check_quota(&self, staged: &HashMap<String, String>) -> Result<()> {
        let Some(quota) = self.quota else {
            return Ok(());
        };

        let count = staged.len() as u64;
        if count > quota.max_items {
            return Err(BridgeError::MaxItemsExceeded {
                count,
                limit: quota.max_items,
            });
        }

        let mut total = 0u64;
        for (key, raw) in staged {
            let bytes = Self::entry_bytes(key, raw);
            if bytes > quota.max_item_bytes {
                return Err(BridgeError::QuotaExceeded {
                    bytes,
                    limit: quota.max_item_bytes,
                });
            }
            total += bytes;
        }

        if total > quota.max_total_bytes {
            return Err(BridgeError::QuotaExceeded {
                bytes: total,
                limit: quota.max_total_bytes,
            });
        }

        Ok(())
    }
}

#[async_trait]
impl StorageArea for MemoryStorageArea {
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, StoredValue>> {
        let entries = self.entries.lock().expect("storage map poisoned");
        let mut values = HashMap::new();

        for key in keys {
            if let Some(raw) = entries.get(*key) {
                let value: StoredValue = serde_json::from_str(raw).map_err(|e| {
                    BridgeError::OperationFailed(format!("Corrupt value for {}: {}", key, e))
                })?;
                values.insert(key.to_string(), value);
            }
        }

        Ok(values)
    }

    async fn set(&self, items: HashMap<String, StoredValue>) -> Result<()> {
        let mut entries = self.entries.lock().expect("storage map poisoned");

        // Validate the post-write state before touching the map so a
        // rejected write leaves the area unchanged.
        let mut staged = entries.clone();
        for (key, value) in &items {
            let raw = serde_json::to_string(value)
                .map_err(|e| BridgeError::OperationFailed(format!("Serialize failed: {}", e)))?;
            staged.insert(key.clone(), raw);
        }

        self.check_quota(&staged)?;
        *entries = staged;
        Ok(())
    }

    async fn remove(&self, keys: &[&str]) -> Result<()> {
        let mut entries = self.entries.lock().expect("storage map poisoned");
        for key in keys {
            entries.remove(*key);
        }
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.entries.lock().expect("storage map poisoned").clear();
        Ok(())
    }

    async fn get_bytes_in_use(&self, keys: Option<&[&str]>) -> Result<u64> {
        let entries = self.entries.lock().expect("storage map poisoned");

        let total = match keys {
            Some(keys) => keys
                .iter()
                .filter_map(|key| entries.get(*key).map(|raw| Self::entry_bytes(key, raw)))
                .sum(),
            None => entries
                .iter()
                .map(|(key, raw)| Self::entry_bytes(key, raw))
                .sum(),
        };

        Ok(total)
    }
}
