//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`ReviewEvent`]s, shared
//! as `Arc<EventBus>` across the application. Publishing is fire-and-forget:
//! delivery and retry toward external consumers is the subscriber's concern,
//! never the publisher's.

use chrono::{DateTime, Utc};
use revq_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// A new item entered the queue.
pub const EVENT_ITEM_SUBMITTED: &str = "item.submitted";

/// An item was bound to a reviewer.
pub const EVENT_ITEM_ASSIGNED: &str = "item.assigned";

/// A decision closed an assignment. Consumed by the external notification
/// collaborator and by asynchronous score recomputation.
pub const EVENT_REVIEW_DECIDED: &str = "review.decided";

/// Rebalancing moved an assignment between reviewers. An audit signal,
/// never a decision.
pub const EVENT_ASSIGNMENT_TRANSFERRED: &str = "assignment.transferred";

/// A batch execution finished (including cancelled ones).
pub const EVENT_BATCH_COMPLETED: &str = "batch.completed";

// ---------------------------------------------------------------------------
// ReviewEvent
// ---------------------------------------------------------------------------

/// A domain event emitted by the review engine.
///
/// The actor field carries the opaque reviewer token only; real identities
/// never cross this boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewEvent {
    /// Dot-separated event name, e.g. `"review.decided"`.
    pub event_type: String,

    /// The review item the event concerns, when applicable.
    pub item_id: Option<DbId>,

    /// The assignment the event concerns, when applicable.
    pub assignment_id: Option<DbId>,

    /// Opaque token of the acting reviewer.
    pub actor: Option<String>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl ReviewEvent {
    /// Create a new event with only the required `event_type`.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            item_id: None,
            assignment_id: None,
            actor: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Attach the subject item.
    pub fn with_item(mut self, item_id: DbId) -> Self {
        self.item_id = Some(item_id);
        self
    }

    /// Attach the subject assignment.
    pub fn with_assignment(mut self, assignment_id: DbId) -> Self {
        self.assignment_id = Some(assignment_id);
        self
    }

    /// Attach the acting reviewer's opaque token.
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`ReviewEvent`].
pub struct EventBus {
    sender: broadcast::Sender<ReviewEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With zero subscribers the event is silently dropped; decisions are
    /// already durable in the store before anything is published.
    pub fn publish(&self, event: ReviewEvent) {
        // Ignore the SendError, it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<ReviewEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
