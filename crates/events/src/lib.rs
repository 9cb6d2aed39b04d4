//! Event and side-channel infrastructure for the review engine.
//!
//! [`bus`] carries fire-and-forget domain events (decisions, transfers,
//! batch completions) to in-process subscribers such as the notification
//! forwarder. [`kv`] is the injected key-value abstraction used for
//! notification staging, so nothing in the engine relies on process-global
//! mutable state.

pub mod bus;
pub mod kv;

pub use bus::{
    EventBus, ReviewEvent, EVENT_ASSIGNMENT_TRANSFERRED, EVENT_BATCH_COMPLETED,
    EVENT_ITEM_ASSIGNED, EVENT_ITEM_SUBMITTED, EVENT_REVIEW_DECIDED,
};
pub use kv::{InMemoryKv, KeyValueStore, KvError};
