//! Data Model for Replica Synchronization
//!
//! Defines the link and category records held by each replica, the version
//! stamp used for conflict detection, and the merge strategy policy.
//!
//! ## Storage shape
//!
//! Each replica persists its data under fixed keys in a key/value area:
//!
//! | Key | Type |
//! |---|---|
//! | `links` | JSON string encoding an array of [`LinkRecord`] |
//! | `categories` | JSON string encoding an array of category names |
//! | `syncMetadata` | JSON object, see [`SyncMetadata`] |
//! | `lastSyncTime` | integer epoch milliseconds (local only) |
//! | `deviceId` | string (local only) |
//!
//! Raw stored values cross into typed structs exactly once, in
//! [`Replica::from_stored`]; malformed payloads are treated uniformly as
//! "replica absent, use defaults" instead of being probed field by field at
//! every call site.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use url::Url;

use crate::error::{Result, SyncError};

/// Storage key for the serialized link array.
pub const LINKS_KEY: &str = "links";
/// Storage key for the serialized category array.
pub const CATEGORIES_KEY: &str = "categories";
/// Storage key for the per-replica version stamp.
pub const SYNC_METADATA_KEY: &str = "syncMetadata";
/// Storage key for the last successful sync time (local area only).
pub const LAST_SYNC_TIME_KEY: &str = "lastSyncTime";
/// Storage key for the persistent installation identifier (local area only).
pub const DEVICE_ID_KEY: &str = "deviceId";

/// Category every resolved replica must contain.
pub const DEFAULT_CATEGORY: &str = "Default";

/// Maximum length of a link name.
pub const MAX_NAME_LEN: usize = 100;
/// Maximum length of a category name.
pub const MAX_CATEGORY_LEN: usize = 50;

/// Display size of a link's icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconSize {
    Small,
    Medium,
    Large,
}

/// One saved link.
///
/// The `url` is the identity key: two records with the same URL in different
/// replicas are the same logical entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    /// Display name, 1-100 characters
    pub name: String,

    /// Absolute URL; identity and dedup key
    pub url: Url,

    /// Category name, 1-50 characters
    pub category: String,

    /// Optional icon URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<Url>,

    /// Optional icon display size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<IconSize>,
}

/// One replica's data: insertion-ordered links and categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replica {
    pub links: Vec<LinkRecord>,
    pub categories: Vec<String>,
}

impl Default for Replica {
    fn default() -> Self {
        Self {
            links: Vec::new(),
            categories: vec![DEFAULT_CATEGORY.to_string()],
        }
    }
}

impl Replica {
    /// Decode a replica from raw stored values.
    ///
    /// This is the single typed deserialization boundary: `links` and
    /// `categories` are parsed from their stored JSON strings once, and any
    /// missing or malformed payload falls back to the empty default for that
    /// collection.
    pub fn from_stored(values: &HashMap<String, serde_json::Value>) -> Self {
        let links = values
            .get(LINKS_KEY)
            .and_then(|v| v.as_str())
            .and_then(|raw| serde_json::from_str::<Vec<LinkRecord>>(raw).ok())
            .unwrap_or_default();

        let categories = values
            .get(CATEGORIES_KEY)
            .and_then(|v| v.as_str())
            .and_then(|raw| serde_json::from_str::<Vec<String>>(raw).ok())
            .unwrap_or_else(|| vec![DEFAULT_CATEGORY.to_string()]);

        Self { links, categories }
    }

    /// Encode this replica into the stored key/value shape.
    pub fn to_stored(&self) -> Result<HashMap<String, serde_json::Value>> {
        let links = serde_json::to_string(&self.links)
            .map_err(|e| SyncError::SaveFailure(format!("Failed to encode links: {}", e)))?;
        let categories = serde_json::to_string(&self.categories)
            .map_err(|e| SyncError::SaveFailure(format!("Failed to encode categories: {}", e)))?;

        Ok(HashMap::from([
            (LINKS_KEY.to_string(), serde_json::Value::String(links)),
            (
                CATEGORIES_KEY.to_string(),
                serde_json::Value::String(categories),
            ),
        ]))
    }

    /// True when the replica holds no links and only the default category.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty() && self.categories == [DEFAULT_CATEGORY]
    }
}

/// Per-replica version stamp used to detect divergence.
///
/// Created lazily on the first successful write to a replica and overwritten
/// after every successful sync. A missing stamp reads as version 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncMetadata {
    /// Replica version (epoch milliseconds)
    pub version: i64,

    /// Last modification time (epoch milliseconds)
    pub last_modified: i64,

    /// Identifier of the installation that wrote the stamp
    #[serde(default)]
    pub device_id: String,
}

impl Default for SyncMetadata {
    fn default() -> Self {
        Self {
            version: 0,
            last_modified: 0,
            device_id: String::new(),
        }
    }
}

impl From<SyncMetadata> for core_runtime::events::SyncStamp {
    fn from(meta: SyncMetadata) -> Self {
        Self {
            version: meta.version,
            last_modified: meta.last_modified,
            device_id: meta.device_id,
        }
    }
}

/// Policy determining which replica wins during a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    /// Local replica wins outright; remote data is discarded
    Local,

    /// Remote replica wins outright; local data is discarded
    Remote,

    /// Reconcile both replicas link by link and union categories
    #[default]
    Merge,
}

impl MergeStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeStrategy::Local => "local",
            MergeStrategy::Remote => "remote",
            MergeStrategy::Merge => "merge",
        }
    }
}

impl FromStr for MergeStrategy {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "local" => Ok(MergeStrategy::Local),
            "remote" => Ok(MergeStrategy::Remote),
            "merge" => Ok(MergeStrategy::Merge),
            other => Err(SyncError::SaveFailure(format!(
                "Unknown merge strategy: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn link(url: &str, name: &str, category: &str) -> LinkRecord {
        LinkRecord {
            name: name.to_string(),
            url: Url::parse(url).unwrap(),
            category: category.to_string(),
            icon: None,
            size: None,
        }
    }

    #[test]
    fn test_replica_roundtrip() {
        let replica = Replica {
            links: vec![link("https://a.com/", "A", "Default")],
            categories: vec!["Default".to_string(), "Work".to_string()],
        };

        let stored = replica.to_stored().unwrap();
        assert!(stored[LINKS_KEY].is_string());
        assert!(stored[CATEGORIES_KEY].is_string());

        let decoded = Replica::from_stored(&stored);
        assert_eq!(decoded, replica);
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let decoded = Replica::from_stored(&HashMap::new());
        assert!(decoded.links.is_empty());
        assert_eq!(decoded.categories, vec![DEFAULT_CATEGORY.to_string()]);
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_malformed_payload_treated_as_absent() {
        // Truncated JSON, a non-array, and a wrong value type all decode
        // to the same defaults instead of failing per-field probes.
        for bad in [json!("[{\"name\":"), json!("{\"not\":\"an array\"}"), json!(42)] {
            let values = HashMap::from([
                (LINKS_KEY.to_string(), bad.clone()),
                (CATEGORIES_KEY.to_string(), bad),
            ]);
            let decoded = Replica::from_stored(&values);
            assert!(decoded.links.is_empty());
            assert_eq!(decoded.categories, vec![DEFAULT_CATEGORY.to_string()]);
        }
    }

    #[test]
    fn test_link_with_invalid_url_invalidates_array() {
        let raw = json!(r#"[{"name":"A","url":"not a url","category":"Default"}]"#);
        let values = HashMap::from([(LINKS_KEY.to_string(), raw)]);
        let decoded = Replica::from_stored(&values);
        assert!(decoded.links.is_empty());
    }

    #[test]
    fn test_metadata_serde_shape() {
        let meta = SyncMetadata {
            version: 1_700_000_000_000,
            last_modified: 1_700_000_000_000,
            device_id: "device_1700000000000_abc123def".to_string(),
        };

        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["version"], 1_700_000_000_000i64);
        assert_eq!(json["lastModified"], 1_700_000_000_000i64);
        assert_eq!(json["deviceId"], "device_1700000000000_abc123def");
    }

    #[test]
    fn test_metadata_defaults_to_version_zero() {
        let meta = SyncMetadata::default();
        assert_eq!(meta.version, 0);
        assert_eq!(meta.last_modified, 0);
    }

    #[test]
    fn test_strategy_roundtrip() {
        for strategy in [MergeStrategy::Local, MergeStrategy::Remote, MergeStrategy::Merge] {
            assert_eq!(strategy.as_str().parse::<MergeStrategy>().unwrap(), strategy);
        }
        assert!("newest".parse::<MergeStrategy>().is_err());
        assert_eq!(MergeStrategy::default(), MergeStrategy::Merge);
    }
}
