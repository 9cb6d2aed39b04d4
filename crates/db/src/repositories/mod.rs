//! Repository layer: stateless structs with async functions over `&PgPool`
//! (or a transaction for the atomic multi-row operations).

pub mod assignment_repo;
pub mod decision_repo;
pub mod review_item_repo;
pub mod reviewer_repo;

pub use assignment_repo::{AssignmentRepo, TransferRepo};
pub use decision_repo::DecisionRepo;
pub use review_item_repo::ReviewItemRepo;
pub use reviewer_repo::ReviewerRepo;
