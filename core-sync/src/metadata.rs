//! Sync Metadata Tracking
//!
//! Reads and writes the per-replica version stamp (`syncMetadata`) used to
//! detect divergence, and manages the persistent per-install device
//! identifier.
//!
//! Reads never fail: a missing, corrupt, or unreadable stamp is reported as
//! version 0, which the resolver treats as "never synced". Writes are
//! per-target: a failed remote stamp is recorded and reported but does not
//! fail the operation, while a failed local stamp does.

use std::collections::HashMap;
use std::sync::Arc;

use bridge_traits::{storage::StorageArea, AreaKind, Clock};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::error::{Result, SyncError};
use crate::model::{SyncMetadata, DEVICE_ID_KEY, SYNC_METADATA_KEY};

/// Metadata stamps for both replicas.
#[derive(Debug, Clone, Default)]
pub struct ReplicaMetadata {
    pub local: SyncMetadata,
    pub remote: SyncMetadata,
}

/// Result of a stamping pass.
#[derive(Debug, Clone)]
pub struct StampOutcome {
    /// The freshly generated stamp
    pub metadata: SyncMetadata,
    /// Targets the stamp was successfully written to
    pub stamped: Vec<AreaKind>,
    /// Remote write failure, when the remote target was requested and failed
    pub remote_error: Option<SyncError>,
}

/// Tracks version stamps across the local and remote replicas.
pub struct MetadataTracker {
    local: Arc<dyn StorageArea>,
    remote: Arc<dyn StorageArea>,
    clock: Arc<dyn Clock>,
}

impl MetadataTracker {
    pub fn new(
        local: Arc<dyn StorageArea>,
        remote: Arc<dyn StorageArea>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            local,
            remote,
            clock,
        }
    }

    /// Read both replicas' stamps.
    ///
    /// Never fails: backend errors and malformed stamps are treated as
    /// "missing" and default to version 0.
    pub async fn read(&self) -> ReplicaMetadata {
        ReplicaMetadata {
            local: Self::read_area(self.local.as_ref(), AreaKind::Local).await,
            remote: Self::read_area(self.remote.as_ref(), AreaKind::Remote).await,
        }
    }

    async fn read_area(area: &dyn StorageArea, kind: AreaKind) -> SyncMetadata {
        let values = match area.get(&[SYNC_METADATA_KEY]).await {
            Ok(values) => values,
            Err(e) => {
                warn!(area = %kind, error = %e, "Metadata read failed, treating as missing");
                return SyncMetadata::default();
            }
        };

        values
            .get(SYNC_METADATA_KEY)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
            .unwrap_or_default()
    }

    /// Generate a fresh stamp and write it to each requested target.
    ///
    /// Targets are written independently: a remote failure is captured in
    /// the returned [`StampOutcome`], a local failure is fatal.
    #[instrument(skip(self))]
    pub async fn stamp(&self, targets: &[AreaKind]) -> Result<StampOutcome> {
        let now = self.clock.unix_timestamp_millis();
        let metadata = SyncMetadata {
            version: now,
            last_modified: now,
            device_id: self.get_or_create_device_id().await?,
        };

        let value = serde_json::to_value(&metadata)
            .map_err(|e| SyncError::SaveFailure(format!("Failed to encode metadata: {}", e)))?;
        let items = HashMap::from([(SYNC_METADATA_KEY.to_string(), value)]);

        let mut stamped = Vec::with_capacity(targets.len());
        let mut remote_error = None;

        for target in targets {
            match target {
                AreaKind::Local => {
                    self.local
                        .set(items.clone())
                        .await
                        .map_err(|e| SyncError::LocalStorage(e.to_string()))?;
                    stamped.push(AreaKind::Local);
                }
                AreaKind::Remote => match self.remote.set(items.clone()).await {
                    Ok(()) => stamped.push(AreaKind::Remote),
                    Err(e) => {
                        let err = SyncError::from_remote(e);
                        warn!(error = %err, "Remote metadata stamp failed");
                        remote_error = Some(err);
                    }
                },
            }
        }

        debug!(version = metadata.version, ?stamped, "Stamped metadata");

        Ok(StampOutcome {
            metadata,
            stamped,
            remote_error,
        })
    }

    /// Read the persisted device identifier without creating one.
    ///
    /// Status surfaces use this lookup; the identifier is only ever created
    /// on the stamping path.
    pub async fn device_id(&self) -> Option<String> {
        match self.local.get(&[DEVICE_ID_KEY]).await {
            Ok(values) => values
                .get(DEVICE_ID_KEY)
                .and_then(|v| v.as_str())
                .filter(|id| !id.is_empty())
                .map(String::from),
            Err(e) => {
                warn!(error = %e, "Device id read failed");
                None
            }
        }
    }

    /// Read the persistent per-install identifier, generating and persisting
    /// it on first use. Idempotent across calls.
    pub async fn get_or_create_device_id(&self) -> Result<String> {
        let values = self
            .local
            .get(&[DEVICE_ID_KEY])
            .await
            .map_err(|e| SyncError::LocalStorage(e.to_string()))?;

        if let Some(existing) = values.get(DEVICE_ID_KEY).and_then(|v| v.as_str()) {
            if !existing.is_empty() {
                return Ok(existing.to_string());
            }
        }

        let suffix: String = Uuid::new_v4().simple().to_string().chars().take(9).collect();
        let device_id = format!("device_{}_{}", self.clock.unix_timestamp_millis(), suffix);

        self.local
            .set(HashMap::from([(
                DEVICE_ID_KEY.to_string(),
                serde_json::Value::String(device_id.clone()),
            )]))
            .await
            .map_err(|e| SyncError::LocalStorage(e.to_string()))?;

        debug!(device_id = %device_id, "Generated device identifier");
        Ok(device_id)
    }
}
