//! Engine orchestration layer.
//!
//! Handlers stay thin; everything that combines validation, repository
//! calls, transactions, and event publication lives here. The pure rules
//! these modules orchestrate come from `revq-core`.

pub mod assignment;
pub mod batch;
pub mod decision;
pub mod rebalance;
pub mod scorer;
