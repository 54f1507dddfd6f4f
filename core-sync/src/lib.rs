//! # Replica Synchronization Module
//!
//! Detects divergence between the local and remote link replicas,
//! reconciles them under a configurable merge policy, validates the result,
//! and persists it back with fallback semantics when the remote store is
//! unavailable or full.
//!
//! ## Overview
//!
//! One sync cycle runs: load both replicas → detect conflict via version
//! stamps → resolve under the strategy → validate → persist (local fatal,
//! remote best-effort) → stamp → notify subscribers.
//!
//! ## Components
//!
//! - **Data Model** (`model`): Link and category records, version stamps, merge strategies
//! - **Metadata Tracker** (`metadata`): Per-replica version stamps and the device identifier
//! - **Conflict Resolver** (`resolver`): Pure merge engine over replica snapshots
//! - **Schema Validator** (`validator`): Pre-commit structural validation
//! - **Sync Orchestrator** (`orchestrator`): The cycle state machine, coalescing, and debounce

pub mod error;
pub mod metadata;
pub mod model;
pub mod orchestrator;
pub mod resolver;
pub mod validator;

pub use error::{Result, SyncError};
pub use metadata::{MetadataTracker, ReplicaMetadata, StampOutcome};
pub use model::{
    IconSize, LinkRecord, MergeStrategy, Replica, SyncMetadata, CATEGORIES_KEY,
    DEFAULT_CATEGORY, DEVICE_ID_KEY, LAST_SYNC_TIME_KEY, LINKS_KEY, SYNC_METADATA_KEY,
};
pub use orchestrator::{SyncConfig, SyncFailure, SyncOrchestrator, SyncReport, SyncStatus};
pub use resolver::{resolve, Resolution, ResolutionOutcome};
pub use validator::{LinkSchemaValidator, SchemaValidator, Validation, ValidationPayload};
