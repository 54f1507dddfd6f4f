//! # Sync Orchestrator
//!
//! Drives one synchronization cycle end to end and owns the engine's only
//! mutable state: the in-flight flag, the queue of coalesced waiters, the
//! last sync time, and the debounce timer.
//!
//! ## Workflow
//!
//! 1. Read both replicas and their metadata stamps
//! 2. Resolve the conflict under the configured strategy
//! 3. Validate the resolved payload (abort before any write on failure)
//! 4. Persist to the local replica (fatal on failure)
//! 5. Persist to the remote replica (best-effort, errors are classified
//!    and broadcast, the cycle still succeeds with local data)
//! 6. Stamp fresh metadata on every target that was writable
//! 7. Record `lastSyncTime` and emit a completion event
//!
//! ## Coalescing
//!
//! `sync()` calls issued while a cycle is in flight never trigger a second
//! cycle. Each joins a FIFO queue of waiters and resolves with the report of
//! the cycle it joined. `debounced_sync()` layers a single resettable timer
//! on top, collapsing bursts of local edits into one remote round-trip.
//!
//! ## Known consistency gap
//!
//! Edits written directly to the local backend while a cycle is in flight
//! are not serialized against it. There is a race window between the
//! cycle's read and a concurrent direct write; callers needing stronger
//! guarantees must route all writes through the orchestrator.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_sync::{SyncConfig, SyncOrchestrator};
//! use std::sync::Arc;
//!
//! # async fn example(orchestrator: Arc<SyncOrchestrator>) {
//! let report = orchestrator.sync(None).await;
//! if report.success {
//!     println!("Synced {} links", report.items_synced);
//! }
//! # }
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use bridge_traits::{storage::StorageArea, AreaKind, Clock};
use core_runtime::events::{EventBus, SyncEvent};
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::error::{Result, SyncError};
use crate::metadata::MetadataTracker;
use crate::model::{
    MergeStrategy, Replica, CATEGORIES_KEY, LAST_SYNC_TIME_KEY, LINKS_KEY, SYNC_METADATA_KEY,
};
use crate::resolver::{self, ResolutionOutcome};
use crate::validator::{SchemaValidator, ValidationPayload};

/// Sync orchestrator configuration.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Strategy applied when `sync(None)` is called
    pub default_strategy: MergeStrategy,

    /// Delay used by `debounced_sync` when no explicit delay is given
    pub debounce: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            default_strategy: MergeStrategy::Merge,
            debounce: Duration::from_millis(1000),
        }
    }
}

impl SyncConfig {
    pub fn with_default_strategy(mut self, strategy: MergeStrategy) -> Self {
        self.default_strategy = strategy;
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

/// Typed failure attached to a [`SyncReport`].
#[derive(Debug, Clone)]
pub struct SyncFailure {
    /// Machine-readable kind, mirroring the error event vocabulary
    pub kind: String,
    pub message: String,
    pub recommendation: String,
}

impl From<&SyncError> for SyncFailure {
    fn from(err: &SyncError) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
            recommendation: err.recommendation().to_string(),
        }
    }
}

/// Outcome of one sync cycle, shared verbatim with every coalesced waiter.
///
/// Public entry points never return a bare error: a failed cycle is a report
/// with `success == false` and the failure attached. A successful cycle may
/// still carry a recoverable remote-leg failure in `error`.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub success: bool,
    /// Completion time (epoch milliseconds)
    pub time: i64,
    /// Number of links in the resolved replica
    pub items_synced: u64,
    /// Strategy that was applied
    pub strategy: MergeStrategy,
    pub error: Option<SyncFailure>,
}

/// Snapshot of the orchestrator's state for UI status surfaces.
#[derive(Debug, Clone)]
pub struct SyncStatus {
    pub in_progress: bool,
    /// Epoch milliseconds of the last successful cycle, if any
    pub last_sync_time: Option<i64>,
    pub strategy: MergeStrategy,
    /// Persistent installation identifier, once a stamp has created it
    pub device_id: Option<String>,
}

/// Mutable state owned exclusively by the orchestrator.
struct SyncState {
    in_progress: bool,
    last_sync_time: Option<i64>,
    waiters: Vec<oneshot::Sender<SyncReport>>,
    debounce_task: Option<JoinHandle<()>>,
}

/// Central orchestrator for replica synchronization.
pub struct SyncOrchestrator {
    local: Arc<dyn StorageArea>,
    remote: Arc<dyn StorageArea>,
    clock: Arc<dyn Clock>,
    metadata: MetadataTracker,
    validator: Arc<dyn SchemaValidator>,
    events: EventBus,
    config: SyncConfig,
    state: Mutex<SyncState>,
}

impl SyncOrchestrator {
    /// Construct an orchestrator, hydrating `lastSyncTime` from the local
    /// backend. A hydration failure is logged and treated as "never synced".
    pub async fn new(
        local: Arc<dyn StorageArea>,
        remote: Arc<dyn StorageArea>,
        clock: Arc<dyn Clock>,
        validator: Arc<dyn SchemaValidator>,
        events: EventBus,
        config: SyncConfig,
    ) -> Self {
        let last_sync_time = match local.get(&[LAST_SYNC_TIME_KEY]).await {
            Ok(values) => values.get(LAST_SYNC_TIME_KEY).and_then(|v| v.as_i64()),
            Err(e) => {
                warn!(error = %e, "Failed to hydrate last sync time");
                None
            }
        };

        let metadata = MetadataTracker::new(local.clone(), remote.clone(), clock.clone());

        Self {
            local,
            remote,
            clock,
            metadata,
            validator,
            events,
            config,
            state: Mutex::new(SyncState {
                in_progress: false,
                last_sync_time,
                waiters: Vec::new(),
                debounce_task: None,
            }),
        }
    }

    /// Run one sync cycle, or join the cycle already in flight.
    ///
    /// Coalesced callers are FIFO and resolve with the report of the cycle
    /// they joined; they never trigger a second cycle, even when they asked
    /// for a different strategy.
    #[instrument(skip(self))]
    pub async fn sync(&self, force: Option<MergeStrategy>) -> SyncReport {
        let strategy = force.unwrap_or(self.config.default_strategy);

        let waiter = {
            let mut state = self.state.lock().await;
            if state.in_progress {
                let (tx, rx) = oneshot::channel();
                state.waiters.push(tx);
                Some(rx)
            } else {
                state.in_progress = true;
                None
            }
        };

        if let Some(rx) = waiter {
            debug!("Joining in-flight sync cycle");
            return match rx.await {
                Ok(report) => report,
                // The running cycle was dropped mid-flight (runtime shutdown)
                Err(_) => self.failure_report(
                    strategy,
                    &SyncError::SaveFailure("In-flight sync cycle was dropped".to_string()),
                ),
            };
        }

        self.events
            .emit(SyncEvent::Started {
                strategy: strategy.to_string(),
            })
            .ok();

        let report = match self.run_cycle(strategy).await {
            Ok(report) => report,
            Err(err) => {
                error!(error = %err, "Sync cycle failed");
                self.emit_error(&err);
                self.failure_report(strategy, &err)
            }
        };

        let waiters = {
            let mut state = self.state.lock().await;
            state.in_progress = false;
            if report.success {
                state.last_sync_time = Some(report.time);
            }
            std::mem::take(&mut state.waiters)
        };
        for waiter in waiters {
            waiter.send(report.clone()).ok();
        }

        report
    }

    /// Execute the full cycle. Only fatal errors propagate; remote-leg
    /// failures are classified, broadcast, and folded into a success report.
    async fn run_cycle(&self, strategy: MergeStrategy) -> Result<SyncReport> {
        let keys = [LINKS_KEY, CATEGORIES_KEY];

        let local_values = self
            .local
            .get(&keys)
            .await
            .map_err(|e| SyncError::LocalStorage(e.to_string()))?;
        let local_replica = Replica::from_stored(&local_values);

        let mut remote_failure: Option<SyncError> = None;
        let remote_replica = match self.remote.get(&keys).await {
            Ok(values) => Replica::from_stored(&values),
            Err(e) => {
                let err = SyncError::from_remote(e);
                warn!(error = %err, "Remote read failed, treating remote replica as empty");
                self.emit_error(&err);
                remote_failure = Some(err);
                Replica::default()
            }
        };

        let stamps = self.metadata.read().await;
        let resolution = resolver::resolve(
            &local_replica,
            &remote_replica,
            &stamps.local,
            &stamps.remote,
            strategy,
        );
        let items_synced = resolution.replica.links.len() as u64;

        // Converged replicas: nothing to validate or persist, and the remote
        // store is not touched.
        if resolution.outcome == ResolutionOutcome::NoConflict {
            let time = self.record_last_sync_time().await?;
            let stamp = (stamps.local.version != 0).then(|| stamps.local.clone().into());

            info!(items_synced, "Replicas already converged, nothing to sync");
            self.events
                .emit(SyncEvent::Completed {
                    time,
                    items_synced,
                    strategy: strategy.to_string(),
                    metadata: stamp,
                })
                .ok();

            return Ok(SyncReport {
                success: true,
                time,
                items_synced,
                strategy,
                error: remote_failure.as_ref().map(SyncFailure::from),
            });
        }

        let stored = resolution.replica.to_stored()?;
        let payload = ValidationPayload {
            links: stored
                .get(LINKS_KEY)
                .and_then(|v| v.as_str())
                .map(String::from),
            categories: stored
                .get(CATEGORIES_KEY)
                .and_then(|v| v.as_str())
                .map(String::from),
        };
        let validation = self.validator.validate(&payload);
        if !validation.valid {
            return Err(SyncError::Validation(validation.errors));
        }

        self.local
            .set(stored.clone())
            .await
            .map_err(|e| SyncError::LocalStorage(e.to_string()))?;

        let mut targets = vec![AreaKind::Local];
        match self.remote.set(stored).await {
            Ok(()) => targets.push(AreaKind::Remote),
            Err(e) => {
                let err = SyncError::from_remote(e);
                warn!(error = %err, "Remote persist failed, continuing with local data");
                self.emit_error(&err);
                remote_failure.get_or_insert(err);
            }
        }

        let outcome = self.metadata.stamp(&targets).await?;
        if let Some(err) = &outcome.remote_error {
            self.emit_error(err);
            remote_failure.get_or_insert(err.clone());
        }

        let time = self.record_last_sync_time().await?;

        info!(
            items_synced,
            strategy = %strategy,
            outcome = ?resolution.outcome,
            remote_ok = remote_failure.is_none(),
            "Sync cycle completed"
        );
        self.events
            .emit(SyncEvent::Completed {
                time,
                items_synced,
                strategy: strategy.to_string(),
                metadata: Some(outcome.metadata.clone().into()),
            })
            .ok();

        Ok(SyncReport {
            success: true,
            time,
            items_synced,
            strategy,
            error: remote_failure.as_ref().map(SyncFailure::from),
        })
    }

    /// Schedule a sync after `delay`, resetting any timer already pending.
    ///
    /// Bursts of local edits collapse into one cycle: only the last
    /// scheduled timer fires.
    pub async fn debounced_sync(self: &Arc<Self>, delay: Option<Duration>) {
        let delay = delay.unwrap_or(self.config.debounce);

        let mut state = self.state.lock().await;
        if let Some(pending) = state.debounce_task.take() {
            pending.abort();
        }

        let orchestrator = Arc::clone(self);
        state.debounce_task = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Clear the stored handle before starting the cycle: a later
            // reset may only ever abort a still-sleeping timer, never a
            // cycle in flight.
            orchestrator.state.lock().await.debounce_task = None;
            orchestrator.sync(None).await;
        }));
    }

    /// Force the remote replica to win outright.
    pub async fn force_pull_from_remote(&self) -> SyncReport {
        self.sync(Some(MergeStrategy::Remote)).await
    }

    /// Force the local replica to win outright.
    pub async fn force_push_to_remote(&self) -> SyncReport {
        self.sync(Some(MergeStrategy::Local)).await
    }

    /// Clear the remote store and forget local sync bookkeeping.
    ///
    /// Removes the local metadata stamp and `lastSyncTime`; link and
    /// category data in the local replica is untouched. Idempotent.
    #[instrument(skip(self))]
    pub async fn clear_sync_data(&self) -> SyncReport {
        match self.try_clear().await {
            Ok(time) => SyncReport {
                success: true,
                time,
                items_synced: 0,
                strategy: self.config.default_strategy,
                error: None,
            },
            Err(err) => {
                error!(error = %err, "Failed to clear sync data");
                self.emit_error(&err);
                self.failure_report(self.config.default_strategy, &err)
            }
        }
    }

    async fn try_clear(&self) -> Result<i64> {
        self.remote.clear().await.map_err(SyncError::from_remote)?;
        self.local
            .remove(&[SYNC_METADATA_KEY, LAST_SYNC_TIME_KEY])
            .await
            .map_err(|e| SyncError::LocalStorage(e.to_string()))?;

        let time = self.clock.unix_timestamp_millis();
        self.state.lock().await.last_sync_time = None;

        info!("Sync data cleared");
        self.events.emit(SyncEvent::Cleared { time }).ok();
        Ok(time)
    }

    /// Current engine status for UI surfaces. Read-only: the device id is
    /// looked up but never created here.
    pub async fn get_sync_status(&self) -> SyncStatus {
        let (in_progress, last_sync_time) = {
            let state = self.state.lock().await;
            (state.in_progress, state.last_sync_time)
        };

        SyncStatus {
            in_progress,
            last_sync_time,
            strategy: self.config.default_strategy,
            device_id: self.metadata.device_id().await,
        }
    }

    /// Handle for subscribing to lifecycle events.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    async fn record_last_sync_time(&self) -> Result<i64> {
        let time = self.clock.unix_timestamp_millis();
        self.local
            .set(HashMap::from([(
                LAST_SYNC_TIME_KEY.to_string(),
                serde_json::Value::from(time),
            )]))
            .await
            .map_err(|e| SyncError::LocalStorage(e.to_string()))?;
        Ok(time)
    }

    fn emit_error(&self, err: &SyncError) {
        self.events
            .emit(SyncEvent::Error {
                kind: err.kind().to_string(),
                message: err.to_string(),
                details: None,
                recommendation: Some(err.recommendation().to_string()),
            })
            .ok();
    }

    fn failure_report(&self, strategy: MergeStrategy, err: &SyncError) -> SyncReport {
        SyncReport {
            success: false,
            time: self.clock.unix_timestamp_millis(),
            items_synced: 0,
            strategy,
            error: Some(SyncFailure::from(err)),
        }
    }
}

impl Drop for SyncOrchestrator {
    fn drop(&mut self) {
        if let Ok(state) = self.state.try_lock() {
            if let Some(pending) = &state.debounce_task {
                pending.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_desktop::MemoryStorageArea;
    use bridge_traits::SystemClock;
    use crate::model::{SyncMetadata, DEVICE_ID_KEY};
    use crate::validator::LinkSchemaValidator;
    use serde_json::json;

    async fn orchestrator(
        local: Arc<MemoryStorageArea>,
        remote: Arc<MemoryStorageArea>,
    ) -> SyncOrchestrator {
        SyncOrchestrator::new(
            local,
            remote,
            Arc::new(SystemClock),
            Arc::new(LinkSchemaValidator),
            EventBus::new(16),
            SyncConfig::default(),
        )
        .await
    }

    async fn seed_replica(
        area: &MemoryStorageArea,
        links: serde_json::Value,
        categories: serde_json::Value,
        version: i64,
    ) {
        let metadata = SyncMetadata {
            version,
            last_modified: version,
            device_id: "device_test".to_string(),
        };
        area.set(HashMap::from([
            (LINKS_KEY.to_string(), json!(links.to_string())),
            (CATEGORIES_KEY.to_string(), json!(categories.to_string())),
            (
                SYNC_METADATA_KEY.to_string(),
                serde_json::to_value(&metadata).unwrap(),
            ),
        ]))
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_no_conflict_skips_remote_writes() {
        let local = Arc::new(MemoryStorageArea::new());
        let remote = Arc::new(MemoryStorageArea::new());
        seed_replica(
            &local,
            json!([{"name":"A","url":"https://a.com/","category":"Default"}]),
            json!(["Default"]),
            100,
        )
        .await;
        seed_replica(
            &remote,
            json!([{"name":"B","url":"https://b.com/","category":"Default"}]),
            json!(["Default"]),
            100,
        )
        .await;
        let remote_before = remote.get(&[LINKS_KEY, SYNC_METADATA_KEY]).await.unwrap();

        let orchestrator = orchestrator(local.clone(), remote.clone()).await;
        let report = orchestrator.sync(None).await;

        assert!(report.success);
        assert_eq!(report.items_synced, 1);
        // Remote untouched, local links unchanged
        let remote_after = remote.get(&[LINKS_KEY, SYNC_METADATA_KEY]).await.unwrap();
        assert_eq!(remote_after, remote_before);
        let local_links = local.get(&[LINKS_KEY]).await.unwrap();
        assert!(local_links[LINKS_KEY].as_str().unwrap().contains("a.com"));
    }

    #[tokio::test]
    async fn test_merge_cycle_persists_and_stamps_both_replicas() {
        let local = Arc::new(MemoryStorageArea::new());
        let remote = Arc::new(MemoryStorageArea::new());
        seed_replica(
            &local,
            json!([{"name":"A","url":"https://a.com/","category":"Default"}]),
            json!(["Default", "Work"]),
            100,
        )
        .await;
        seed_replica(
            &remote,
            json!([{"name":"B","url":"https://b.com/","category":"Default"}]),
            json!(["Default", "Home"]),
            200,
        )
        .await;

        let orchestrator = orchestrator(local.clone(), remote.clone()).await;
        let report = orchestrator.sync(None).await;

        assert!(report.success);
        assert_eq!(report.items_synced, 2);
        assert!(report.error.is_none());

        for area in [&local, &remote] {
            let values = area.get(&[LINKS_KEY, CATEGORIES_KEY, SYNC_METADATA_KEY]).await.unwrap();
            let replica = Replica::from_stored(&values);
            let urls: Vec<&str> = replica.links.iter().map(|l| l.url.as_str()).collect();
            assert_eq!(urls, vec!["https://a.com/", "https://b.com/"]);
            assert_eq!(replica.categories, vec!["Default", "Work", "Home"]);

            let stamp: SyncMetadata =
                serde_json::from_value(values[SYNC_METADATA_KEY].clone()).unwrap();
            assert!(stamp.version > 200);
        }

        let status = orchestrator.get_sync_status().await;
        assert!(!status.in_progress);
        assert_eq!(status.last_sync_time, Some(report.time));
        // Stamping created the device id, so the status now carries it
        assert!(status.device_id.unwrap().starts_with("device_"));
    }

    #[tokio::test]
    async fn test_quota_failure_on_remote_is_recoverable() {
        let local = Arc::new(MemoryStorageArea::new());
        // Remote full from the start
        let remote = Arc::new(MemoryStorageArea::with_quota(
            bridge_desktop::QuotaConfig {
                max_item_bytes: 10,
                ..Default::default()
            },
        ));
        seed_replica(
            &local,
            json!([{"name":"A","url":"https://a.com/","category":"Default"}]),
            json!(["Default"]),
            100,
        )
        .await;

        let orchestrator = orchestrator(local.clone(), remote).await;
        let mut events = orchestrator.events().subscribe();
        let report = orchestrator.sync(None).await;

        assert!(report.success);
        let failure = report.error.expect("recoverable failure attached");
        assert_eq!(failure.kind, "quota_exceeded");

        // An error event fired alongside the completion event
        let mut kinds = Vec::new();
        while let Ok(event) = events.try_recv() {
            if let SyncEvent::Error { kind, .. } = event {
                kinds.push(kind);
            }
        }
        assert!(kinds.contains(&"quota_exceeded".to_string()));
    }

    #[tokio::test]
    async fn test_validation_abort_writes_nothing() {
        let local = Arc::new(MemoryStorageArea::new());
        let remote = Arc::new(MemoryStorageArea::new());
        // Name over the limit passes deserialization but fails validation
        let long_name = "x".repeat(101);
        seed_replica(
            &local,
            json!([{"name": long_name, "url":"https://a.com/","category":"Default"}]),
            json!(["Default"]),
            100,
        )
        .await;
        seed_replica(&remote, json!([]), json!(["Default"]), 200).await;
        let local_before = local.get(&[LINKS_KEY, SYNC_METADATA_KEY]).await.unwrap();

        let orchestrator = orchestrator(local.clone(), remote.clone()).await;
        let mut events = orchestrator.events().subscribe();
        let report = orchestrator.sync(None).await;

        assert!(!report.success);
        assert_eq!(report.error.unwrap().kind, "validation_error");
        assert_eq!(
            local.get(&[LINKS_KEY, SYNC_METADATA_KEY]).await.unwrap(),
            local_before
        );
        assert!(!remote.contains_key(LAST_SYNC_TIME_KEY).await.unwrap());

        let mut saw_validation_error = false;
        while let Ok(event) = events.try_recv() {
            if matches!(&event, SyncEvent::Error { kind, .. } if kind == "validation_error") {
                saw_validation_error = true;
            }
        }
        assert!(saw_validation_error);
    }

    #[tokio::test]
    async fn test_force_pull_discards_local() {
        let local = Arc::new(MemoryStorageArea::new());
        let remote = Arc::new(MemoryStorageArea::new());
        seed_replica(
            &local,
            json!([{"name":"A","url":"https://a.com/","category":"Default"}]),
            json!(["Default"]),
            100,
        )
        .await;
        seed_replica(
            &remote,
            json!([{"name":"B","url":"https://b.com/","category":"Default"}]),
            json!(["Default"]),
            200,
        )
        .await;

        let orchestrator = orchestrator(local.clone(), remote).await;
        let report = orchestrator.force_pull_from_remote().await;

        assert!(report.success);
        assert_eq!(report.strategy, MergeStrategy::Remote);
        let replica = Replica::from_stored(&local.get(&[LINKS_KEY, CATEGORIES_KEY]).await.unwrap());
        assert_eq!(replica.links.len(), 1);
        assert_eq!(replica.links[0].url.as_str(), "https://b.com/");
    }

    #[tokio::test]
    async fn test_clear_sync_data_is_idempotent() {
        let local = Arc::new(MemoryStorageArea::new());
        let remote = Arc::new(MemoryStorageArea::new());
        seed_replica(&remote, json!([]), json!(["Default"]), 200).await;
        local
            .set(HashMap::from([(
                LAST_SYNC_TIME_KEY.to_string(),
                json!(1_700_000_000_000i64),
            )]))
            .await
            .unwrap();

        let orchestrator = orchestrator(local.clone(), remote.clone()).await;
        let mut events = orchestrator.events().subscribe();

        let first = orchestrator.clear_sync_data().await;
        let second = orchestrator.clear_sync_data().await;

        assert!(first.success);
        assert!(second.success);
        assert!(!remote.contains_key(SYNC_METADATA_KEY).await.unwrap());
        assert!(!local.contains_key(LAST_SYNC_TIME_KEY).await.unwrap());
        assert_eq!(
            orchestrator.get_sync_status().await.last_sync_time,
            None
        );

        assert!(matches!(
            events.try_recv().unwrap(),
            SyncEvent::Cleared { .. }
        ));
        assert!(matches!(
            events.try_recv().unwrap(),
            SyncEvent::Cleared { .. }
        ));
    }

    #[tokio::test]
    async fn test_status_hydrates_last_sync_time() {
        let local = Arc::new(MemoryStorageArea::new());
        local
            .set(HashMap::from([(
                LAST_SYNC_TIME_KEY.to_string(),
                json!(1_700_000_000_000i64),
            )]))
            .await
            .unwrap();

        let orchestrator = orchestrator(local.clone(), Arc::new(MemoryStorageArea::new())).await;
        let status = orchestrator.get_sync_status().await;

        assert_eq!(status.last_sync_time, Some(1_700_000_000_000));
        assert!(!status.in_progress);
        // No sync has stamped yet; a status read must not create the id
        assert_eq!(status.device_id, None);
        assert!(!local.contains_key(DEVICE_ID_KEY).await.unwrap());
    }
}
