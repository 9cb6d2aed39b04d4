//! HTTP handlers. Thin: deserialize, resolve the actor, call the engine,
//! wrap the result in the standard envelope.

pub mod admin;
pub mod batch;
pub mod decisions;
pub mod health;
pub mod items;
pub mod performance;
pub mod queue;
pub mod reviewers;
