use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("Item of {bytes} bytes exceeds per-item quota of {limit} bytes")]
    QuotaExceeded { bytes: u64, limit: u64 },

    #[error("Store holds {count} items, exceeding the limit of {limit}")]
    MaxItemsExceeded { count: u64, limit: u64 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
