use bridge_traits::BridgeError;
use thiserror::Error;

/// Error taxonomy for one sync cycle.
///
/// Fatal variants abort the cycle and fail every queued waiter; recoverable
/// variants only affect the remote leg and are broadcast as error events
/// while the cycle still succeeds with local data.
#[derive(Error, Debug, Clone)]
pub enum SyncError {
    /// Local backend read/write failed. Always fatal.
    #[error("Local storage error: {0}")]
    LocalStorage(String),

    /// Remote backend rejected an operation for an unclassified reason.
    #[error("Sync storage error: {0}")]
    SyncStorage(String),

    /// A single item exceeded the remote per-item byte quota.
    #[error("Item of {bytes} bytes exceeds the sync quota of {limit} bytes")]
    QuotaExceeded { bytes: u64, limit: u64 },

    /// The remote store item-count ceiling was hit.
    #[error("Sync store holds {count} items, exceeding the limit of {limit}")]
    MaxItemsExceeded { count: u64, limit: u64 },

    /// The remote backend was unreachable.
    #[error("Network error: {0}")]
    Network(String),

    /// The resolved payload failed schema validation. Fatal, pre-commit:
    /// nothing has been persisted.
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Unexpected persistence failure after validation passed.
    #[error("Save failure: {0}")]
    SaveFailure(String),
}

impl SyncError {
    /// Machine-readable kind, used as the `kind` field of error events.
    pub fn kind(&self) -> &'static str {
        match self {
            SyncError::LocalStorage(_) => "local_storage_error",
            SyncError::SyncStorage(_) => "sync_storage_error",
            SyncError::QuotaExceeded { .. } => "quota_exceeded",
            SyncError::MaxItemsExceeded { .. } => "max_items_exceeded",
            SyncError::Network(_) => "network_error",
            SyncError::Validation(_) => "validation_error",
            SyncError::SaveFailure(_) => "save_failure",
        }
    }

    /// Human-readable remediation hint surfaced with error events.
    pub fn recommendation(&self) -> &'static str {
        match self {
            SyncError::LocalStorage(_) => {
                "Check available disk space and storage permissions, then retry"
            }
            SyncError::SyncStorage(_) => {
                "The remote store rejected the write; local data is intact, retry later"
            }
            SyncError::QuotaExceeded { .. } => {
                "Reduce the number or size of saved links, or clear sync data"
            }
            SyncError::MaxItemsExceeded { .. } => {
                "Remove some items from the remote store, or clear sync data"
            }
            SyncError::Network(_) => "Check your network connection and retry",
            SyncError::Validation(_) => {
                "The resolved data failed validation; nothing was persisted"
            }
            SyncError::SaveFailure(_) => {
                "Retry the sync; if the problem persists, clear sync data and sync again"
            }
        }
    }

    /// Whether this error aborts the cycle.
    ///
    /// Remote-leg failures are recoverable: the cycle still reports success
    /// using local-only data.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SyncError::LocalStorage(_) | SyncError::Validation(_) | SyncError::SaveFailure(_)
        )
    }

    /// Classify a remote-backend failure into the sync taxonomy.
    pub fn from_remote(err: BridgeError) -> Self {
        match err {
            BridgeError::QuotaExceeded { bytes, limit } => {
                SyncError::QuotaExceeded { bytes, limit }
            }
            BridgeError::MaxItemsExceeded { count, limit } => {
                SyncError::MaxItemsExceeded { count, limit }
            }
            BridgeError::Network(message) => SyncError::Network(message),
            other => SyncError::SyncStorage(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
