//! Pure domain logic for the review queue and assignment engine.
//!
//! Everything in this crate is side-effect free: validation, the decision
//! state machine, workload and rebalancing math, batch filter predicates,
//! and performance scoring. Persistence and orchestration live in
//! `revq-db` and `revq-api`.

pub mod actor;
pub mod batch;
pub mod decision;
pub mod error;
pub mod item;
pub mod scoring;
pub mod types;
pub mod workload;

pub use error::CoreError;
