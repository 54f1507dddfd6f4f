use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Service initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    #[error("Sync error: {0}")]
    Sync(#[from] core_sync::SyncError),
}

impl ServiceError {
    pub(crate) fn missing(capability: &str, message: &str) -> Self {
        Self::CapabilityMissing {
            capability: capability.to_string(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
