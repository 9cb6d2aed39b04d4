//! Shared primitive type aliases.

/// Database row identifier (`BIGSERIAL` in Postgres).
pub type DbId = i64;

/// UTC timestamp used across all records.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
