//! Internal event stream for store outcomes
//!
//! The [`EventBus`] decouples the collection stores from presentation. A
//! store publishes one [`StoreEvent`] per completed operation; subscribers
//! (the notification relay, loggers, future listeners) react without the
//! store knowing they exist.
//!
//! ```text
//! CollectionStore ──▶ EventBus::publish() ──▶ broadcast channel ──▶ NotificationRelay
//!                                                                ──▶ other subscribers
//! ```
//!
//! Built on `tokio::sync::broadcast`: cheap to clone, multi-receiver,
//! fire-and-forget publishing.

use crate::core::error::DataError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// The mutating operation a failure event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Add,
    Update,
    Remove,
}

impl Operation {
    /// Verb used in notification copy ("add", "update", "remove")
    pub fn verb(&self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Update => "update",
            Operation::Remove => "remove",
        }
    }
}

/// Outcome of one store operation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StoreEvent {
    /// The initial read succeeded and the mirror is populated
    Loaded { entity: String, count: usize },

    /// The initial read failed; the mirror stays absent
    LoadFailed { entity: String, error: DataError },

    /// A row was inserted and prepended to the mirror
    Created { entity: String, id: Uuid },

    /// A row was updated in place
    Updated { entity: String, id: Uuid },

    /// A row was removed from the mirror
    Deleted { entity: String, id: Uuid },

    /// A mutation failed; the mirror was left untouched
    MutationFailed {
        entity: String,
        operation: Operation,
        error: DataError,
    },

    /// A remote procedure call failed
    ProcedureFailed { procedure: String, error: DataError },
}

impl StoreEvent {
    /// The entity this event refers to, if any
    pub fn entity(&self) -> Option<&str> {
        match self {
            StoreEvent::Loaded { entity, .. }
            | StoreEvent::LoadFailed { entity, .. }
            | StoreEvent::Created { entity, .. }
            | StoreEvent::Updated { entity, .. }
            | StoreEvent::Deleted { entity, .. }
            | StoreEvent::MutationFailed { entity, .. } => Some(entity),
            StoreEvent::ProcedureFailed { .. } => None,
        }
    }

    /// The error carried by failure events
    pub fn error(&self) -> Option<&DataError> {
        match self {
            StoreEvent::LoadFailed { error, .. }
            | StoreEvent::MutationFailed { error, .. }
            | StoreEvent::ProcedureFailed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Whether this event represents a failure
    pub fn is_failure(&self) -> bool {
        self.error().is_some()
    }
}

/// Envelope wrapping a store event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event ID
    pub id: Uuid,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    /// The actual event
    pub event: StoreEvent,
}

impl EventEnvelope {
    /// Create a new event envelope
    pub fn new(event: StoreEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Broadcast-based event bus shared by all stores of one application context
///
/// Cheap to clone (Arc internally). If there are no subscribers, published
/// events are simply dropped; lagging subscribers receive a `Lagged` error
/// on their next `recv()`.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    ///
    /// Non-blocking and infallible. Returns the number of receivers that
    /// will see the event.
    pub fn publish(&self, event: StoreEvent) -> usize {
        let envelope = EventEnvelope::new(event);
        // send() errs only when there are no receivers, which is fine
        self.sender.send(envelope).unwrap_or(0)
    }

    /// Subscribe to future events
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    /// Current number of active subscribers
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}
