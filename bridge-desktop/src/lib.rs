//! # Desktop Bridge Implementations
//!
//! Desktop adapters for the platform traits defined in `bridge-traits`.
//!
//! ## Overview
//!
//! - [`SqliteStorageArea`] - persistent key/value area backed by SQLite,
//!   used for the device-local replica
//! - [`MemoryStorageArea`] - in-memory area with optional quota enforcement,
//!   used for the remote replica in tests and quota simulations

pub mod memory;
pub mod sqlite;

pub use memory::{MemoryStorageArea, QuotaConfig};
pub use sqlite::SqliteStorageArea;
