//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the sync core and platform-specific
//! implementations. Each trait represents a capability the core requires but
//! that must be implemented differently per platform (desktop, browser
//! extension, tests).
//!
//! ## Traits
//!
//! - [`StorageArea`](storage::StorageArea) - Async key/value backend for one
//!   replica (local cache or quota-limited remote store)
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//!
//! ## Fail-Fast Strategy
//!
//! The core fails fast with descriptive errors when a required capability is
//! missing; see `core_service::ServiceError::CapabilityMissing`.
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type.
//! Platform implementations should convert platform-specific failures into
//! the quota/item-count/network variants so the core can classify a failed
//! remote write without inspecting adapter internals.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds to support safe concurrent
//! usage across async tasks.

pub mod error;
pub mod storage;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use storage::{AreaKind, StorageArea, StoredValue};
pub use time::{Clock, SystemClock};
