//! # Event Bus System
//!
//! Provides an event-driven architecture for the Linkdock core using
//! `tokio::sync::broadcast`. Sync lifecycle events fan out to every
//! subscriber (status indicators, badges, logs) without coupling the engine
//! to any of them.
//!
//! ## Overview
//!
//! The event bus system consists of:
//! - **Event Types**: A typed [`SyncEvent`] enum covering the sync lifecycle
//! - **EventBus**: Central broadcast channel for publishing events
//! - **EventStream**: Wrapper for consuming events with filtering
//! - **Subscription Management**: Multiple subscribers listen independently;
//!   dropping a receiver is the unsubscribe handle
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{EventBus, SyncEvent};
//!
//! let event_bus = EventBus::new(100);
//! let mut subscriber = event_bus.subscribe();
//!
//! event_bus.emit(SyncEvent::Started {
//!     strategy: "merge".to_string(),
//! }).ok();
//! ```
//!
//! ## Error Handling
//!
//! The bus uses `tokio::sync::broadcast`:
//!
//! - **`RecvError::Lagged(n)`**: a subscriber was too slow and missed `n`
//!   events. Non-fatal; the subscriber keeps receiving new events.
//! - **`RecvError::Closed`**: all senders have been dropped.
//!
//! A slow or failing subscriber never blocks other subscribers and never
//! aborts the sync cycle that emitted the event.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
///
/// This value balances memory usage with the ability to handle bursts of
/// events. Subscribers that can't keep up will receive `RecvError::Lagged`.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Event Types
// ============================================================================

/// Version stamp attached to completion events.
///
/// Mirrors the metadata record the sync core writes to each replica after a
/// successful cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SyncStamp {
    /// Replica version (epoch milliseconds)
    pub version: i64,
    /// Last modification time (epoch milliseconds)
    pub last_modified: i64,
    /// Identifier of the installation that wrote the stamp
    pub device_id: String,
}

/// Events emitted over the lifecycle of a sync cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum SyncEvent {
    /// A sync cycle started.
    Started {
        /// Merge strategy in effect for this cycle.
        strategy: String,
    },
    /// A sync cycle finished successfully.
    Completed {
        /// Completion time (epoch milliseconds).
        time: i64,
        /// Number of links in the resolved replica.
        items_synced: u64,
        /// Merge strategy that was applied.
        strategy: String,
        /// Stamp written to the replicas, when stamping succeeded.
        metadata: Option<SyncStamp>,
    },
    /// A sync error occurred. Fatal errors also fail the cycle; recoverable
    /// remote-side errors are reported here while the cycle still succeeds.
    Error {
        /// Machine-readable error kind (e.g. `quota_exceeded`).
        kind: String,
        /// Human-readable error message.
        message: String,
        /// Optional underlying error detail.
        details: Option<String>,
        /// Suggested remediation for the user.
        recommendation: Option<String>,
    },
    /// Sync data was cleared from the remote store.
    Cleared {
        /// Time of the clear operation (epoch milliseconds).
        time: i64,
    },
}

impl SyncEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            SyncEvent::Started { .. } => "Sync started",
            SyncEvent::Completed { .. } => "Sync completed successfully",
            SyncEvent::Error { .. } => "Sync error",
            SyncEvent::Cleared { .. } => "Sync data cleared",
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            SyncEvent::Error { .. } => EventSeverity::Error,
            SyncEvent::Completed { .. } | SyncEvent::Cleared { .. } => EventSeverity::Info,
            SyncEvent::Started { .. } => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Debug-level events (verbose)
    Debug,
    /// Informational events
    Info,
    /// Warning events
    Warning,
    /// Error events
    Error,
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to sync events.
///
/// Uses `tokio::sync::broadcast` internally, which provides:
/// - Multiple producers (clone the `EventBus`)
/// - Multiple consumers (each `subscribe()` creates a new receiver)
/// - Non-blocking sends (events are cloned for each subscriber)
/// - Lagging detection (slow subscribers get `RecvError::Lagged`)
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SyncEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of events to buffer per subscriber.
    ///   When a subscriber falls behind by more than this amount, it will
    ///   receive a `RecvError::Lagged` error.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Creates a new event bus with the default buffer size.
    #[allow(clippy::should_implement_trait)]
    pub fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event.
    /// Returns an error if there are no active subscribers; emitting into an
    /// empty bus is harmless and callers typically discard the result.
    pub fn emit(&self, event: SyncEvent) -> Result<usize, SendError<SyncEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber to receive events.
    ///
    /// Each call creates an independent receiver that will receive all future
    /// events. Past events are not replayed. Dropping the receiver
    /// unsubscribes it.
    pub fn subscribe(&self) -> Receiver<SyncEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

/// Type alias for event filter functions.
type EventFilter = Box<dyn Fn(&SyncEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with additional filtering
/// capabilities.
///
/// # Example
///
/// ```rust
/// use core_runtime::events::{EventBus, EventStream, SyncEvent};
///
/// let event_bus = EventBus::new(100);
/// let errors_only = EventStream::new(event_bus.subscribe())
///     .filter(|event| matches!(event, SyncEvent::Error { .. }));
/// ```
pub struct EventStream {
    receiver: Receiver<SyncEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    /// Creates a new event stream from a receiver.
    pub fn new(receiver: Receiver<SyncEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Adds a filter function to this stream.
    ///
    /// Only events that match the filter will be returned by `recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&SyncEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Receives the next event that passes the filter (if any).
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n`
    /// events. Returns `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<SyncEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;

            let Some(filter) = &self.filter else {
                return Ok(event);
            };

            if filter(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without blocking.
    ///
    /// Returns `None` if no matching events are currently available.
    pub fn try_recv(&mut self) -> Option<Result<SyncEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    let Some(filter) = &self.filter else {
                        return Some(Ok(event));
                    };

                    if filter(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
