//! Service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (the two replica
//! storage areas, a clock, a schema validator) into the sync engine and
//! exposes the engine's public entry points behind one explicitly
//! constructed, dependency-injected handle. There is no ambient global: the
//! host composes a [`LinkdockService`] at startup and passes it to whatever
//! owns the UI layer.
//!
//! Desktop apps typically enable the `desktop-shims` feature and call
//! [`bootstrap_desktop`], which backs the local replica with SQLite and the
//! remote replica with a quota-enforcing shim until a hosted store is wired.

pub mod error;

pub use error::{Result, ServiceError};

// Hosts configure logging through the same surface that wires the service.
pub use core_runtime::logging::{init_logging, LogFormat, LogLevel, LoggingConfig};

use std::sync::Arc;
use std::time::Duration;

use bridge_traits::{storage::StorageArea, Clock, SystemClock};
use core_runtime::events::{EventBus, Receiver, SyncEvent};
use core_sync::{
    LinkSchemaValidator, MergeStrategy, SchemaValidator, SyncConfig, SyncOrchestrator, SyncReport,
    SyncStatus,
};
use tracing::info;

/// Bridge handles the sync engine requires, collected before construction.
///
/// The storage areas are mandatory; construction fails fast with
/// [`ServiceError::CapabilityMissing`] when one is absent. The clock and
/// validator fall back to the production defaults.
#[derive(Default)]
pub struct ServiceDependencies {
    local_area: Option<Arc<dyn StorageArea>>,
    remote_area: Option<Arc<dyn StorageArea>>,
    clock: Option<Arc<dyn Clock>>,
    validator: Option<Arc<dyn SchemaValidator>>,
}

impl ServiceDependencies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_local_area(mut self, area: Arc<dyn StorageArea>) -> Self {
        self.local_area = Some(area);
        self
    }

    pub fn with_remote_area(mut self, area: Arc<dyn StorageArea>) -> Self {
        self.remote_area = Some(area);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn with_validator(mut self, validator: Arc<dyn SchemaValidator>) -> Self {
        self.validator = Some(validator);
        self
    }
}

/// Primary façade exposed to host applications.
///
/// UI collaborators consume only the event subscription interface and the
/// entry points below; they never read the replicas directly.
#[derive(Clone)]
pub struct LinkdockService {
    orchestrator: Arc<SyncOrchestrator>,
    events: EventBus,
}

impl LinkdockService {
    /// Wire the sync engine from explicit dependencies.
    pub async fn new(deps: ServiceDependencies, config: SyncConfig) -> Result<Self> {
        let local = deps.local_area.ok_or_else(|| {
            ServiceError::missing("local_area", "no local replica storage was provided")
        })?;
        let remote = deps.remote_area.ok_or_else(|| {
            ServiceError::missing("remote_area", "no remote replica storage was provided")
        })?;
        let clock = deps.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let validator = deps
            .validator
            .unwrap_or_else(|| Arc::new(LinkSchemaValidator));

        let events = EventBus::default();
        let orchestrator = Arc::new(
            SyncOrchestrator::new(local, remote, clock, validator, events.clone(), config).await,
        );

        info!("Linkdock service initialized");
        Ok(Self {
            orchestrator,
            events,
        })
    }

    /// Run a sync cycle with the configured default strategy.
    pub async fn sync(&self) -> SyncReport {
        self.orchestrator.sync(None).await
    }

    /// Run a sync cycle forcing a specific strategy.
    pub async fn sync_with(&self, strategy: MergeStrategy) -> SyncReport {
        self.orchestrator.sync(Some(strategy)).await
    }

    /// Schedule a sync after a quiet period, resetting any pending timer.
    pub async fn debounced_sync(&self, delay: Option<Duration>) {
        self.orchestrator.debounced_sync(delay).await
    }

    /// Overwrite local data with the remote replica.
    pub async fn force_pull_from_remote(&self) -> SyncReport {
        self.orchestrator.force_pull_from_remote().await
    }

    /// Overwrite the remote replica with local data.
    pub async fn force_push_to_remote(&self) -> SyncReport {
        self.orchestrator.force_push_to_remote().await
    }

    /// Clear the remote store and local sync bookkeeping.
    pub async fn clear_sync_data(&self) -> SyncReport {
        self.orchestrator.clear_sync_data().await
    }

    /// Current engine status for UI surfaces.
    pub async fn get_sync_status(&self) -> SyncStatus {
        self.orchestrator.get_sync_status().await
    }

    /// Subscribe to sync lifecycle events. Dropping the receiver
    /// unsubscribes it.
    pub fn subscribe(&self) -> Receiver<SyncEvent> {
        self.events.subscribe()
    }

    /// Handle to the underlying event bus.
    pub fn events(&self) -> &EventBus {
        &self.events
    }
}

/// Bootstrap a desktop service: SQLite-backed local replica, quota-enforcing
/// in-memory shim standing in for the hosted remote store.
#[cfg(feature = "desktop-shims")]
pub async fn bootstrap_desktop(
    db_path: impl Into<std::path::PathBuf>,
    config: SyncConfig,
) -> Result<LinkdockService> {
    use bridge_desktop::{MemoryStorageArea, QuotaConfig, SqliteStorageArea};

    let local = SqliteStorageArea::new(db_path.into())
        .await
        .map_err(|e| ServiceError::InitializationFailed(e.to_string()))?;
    let remote = MemoryStorageArea::with_quota(QuotaConfig::default());

    let deps = ServiceDependencies::new()
        .with_local_area(Arc::new(local))
        .with_remote_area(Arc::new(remote));
    LinkdockService::new(deps, config).await
}
