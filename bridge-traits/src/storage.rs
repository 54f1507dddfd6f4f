//! Storage Area Abstractions
//!
//! Provides platform-agnostic traits for the key/value areas that hold
//! replica data: a device-local cache and a quota-limited remote store.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::Result;

/// JSON value stored in a storage area.
///
/// Areas persist loosely-typed payloads (JSON strings, integers, objects);
/// typed decoding happens at a single deserialization boundary in the core,
/// never inside the adapter.
pub type StoredValue = serde_json::Value;

/// Identifies which replica a storage area backs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AreaKind {
    /// Device-local cache. Large capacity, always writable.
    Local,
    /// Remote store propagated across installations. Small per-item
    /// quota; writes may fail due to quota, item count, or network.
    Remote,
}

impl AreaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AreaKind::Local => "local",
            AreaKind::Remote => "remote",
        }
    }
}

impl std::fmt::Display for AreaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Asynchronous key/value storage area
///
/// Abstracts the two backends the sync core reads and writes:
/// - Desktop: SQLite-backed local area, cloud-backed remote area
/// - Browser: extension local/sync storage areas
/// - Tests: in-memory areas with optional quota enforcement
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::StorageArea;
///
/// async fn read_links(area: &dyn StorageArea) -> Result<Option<String>> {
///     let values = area.get(&["links"]).await?;
///     Ok(values.get("links").and_then(|v| v.as_str()).map(String::from))
/// }
/// ```
#[async_trait]
pub trait StorageArea: Send + Sync {
    /// Fetch the values stored under `keys`.
    ///
    /// Missing keys are simply absent from the returned map; asking for a
    /// key that was never written is not an error.
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, StoredValue>>;

    /// Write every entry of `items`, overwriting existing values.
    ///
    /// Remote areas may reject the write with `QuotaExceeded`,
    /// `MaxItemsExceeded`, or `Network` errors.
    async fn set(&self, items: HashMap<String, StoredValue>) -> Result<()>;

    /// Delete the entries stored under `keys`. Missing keys are ignored.
    async fn remove(&self, keys: &[&str]) -> Result<()>;

    /// Delete every entry in the area.
    async fn clear(&self) -> Result<()>;

    /// Number of bytes used by `keys`, or by the whole area when `None`.
    ///
    /// A stored entry is accounted as the length of its key plus the length
    /// of its JSON-serialized value.
    async fn get_bytes_in_use(&self, keys: Option<&[&str]>) -> Result<u64>;

    /// Check whether a key currently holds a value.
    async fn contains_key(&self, key: &str) -> Result<bool> {
        Ok(self.get(&[key]).await?.contains_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_kind_names() {
        assert_eq!(AreaKind::Local.as_str(), "local");
        assert_eq!(AreaKind::Remote.to_string(), "remote");
    }
}
