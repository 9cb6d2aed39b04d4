//! Reviewer identity and capability model.
//!
//! Reviewers are anonymous: the engine only ever sees a stable opaque
//! token minted by the external identity boundary. [`Actor`] is the
//! capability object resolved once at the API boundary and passed into
//! every engine call, so the engine never performs ambient permission
//! lookups and is testable without a live authorization service.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ReviewerId
// ---------------------------------------------------------------------------

/// Opaque, stable reviewer identifier.
///
/// Carries no reverse path to a real-world identity. Supports equality,
/// hashing, and display of the token itself; nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewerId(String);

impl ReviewerId {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, used only for persistence binds and event payloads.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ReviewerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Permission
// ---------------------------------------------------------------------------

/// A single capability granted to a reviewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// May hold assignments and record decisions.
    ApproveItems,
    /// May trigger queue administration such as manual rebalancing.
    ManageQueue,
}

impl Permission {
    /// Stable string label as stored in the reviewers table.
    pub fn label(&self) -> &'static str {
        match self {
            Permission::ApproveItems => "approve_items",
            Permission::ManageQueue => "manage_queue",
        }
    }

    /// Parse a stored label. Unknown labels are ignored by callers rather
    /// than treated as errors, so new permissions can roll out gradually.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "approve_items" => Some(Permission::ApproveItems),
            "manage_queue" => Some(Permission::ManageQueue),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ReviewerLevel
// ---------------------------------------------------------------------------

/// Experience level of a reviewer, maintained by the external identity
/// boundary and consumed here for batch eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewerLevel {
    New,
    Active,
    Experienced,
    Advanced,
    Expert,
}

impl ReviewerLevel {
    pub fn label(&self) -> &'static str {
        match self {
            ReviewerLevel::New => "new",
            ReviewerLevel::Active => "active",
            ReviewerLevel::Experienced => "experienced",
            ReviewerLevel::Advanced => "advanced",
            ReviewerLevel::Expert => "expert",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "new" => Some(ReviewerLevel::New),
            "active" => Some(ReviewerLevel::Active),
            "experienced" => Some(ReviewerLevel::Experienced),
            "advanced" => Some(ReviewerLevel::Advanced),
            "expert" => Some(ReviewerLevel::Expert),
            _ => None,
        }
    }

    /// Levels allowed through the batch-operation gate.
    pub fn qualifies_for_batch(&self) -> bool {
        matches!(
            self,
            ReviewerLevel::Experienced | ReviewerLevel::Advanced | ReviewerLevel::Expert
        )
    }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

/// Capability object passed into engine calls.
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: ReviewerId,
    pub level: ReviewerLevel,
    pub permissions: Vec<Permission>,
}

impl Actor {
    pub fn new(id: ReviewerId, level: ReviewerLevel, permissions: Vec<Permission>) -> Self {
        Self {
            id,
            level,
            permissions,
        }
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
