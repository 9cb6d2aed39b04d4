//! End-to-end scenario through the engine layer: submit into an empty
//! reviewer pool, register a reviewer, assign, decide, and verify the
//! terminal states and the derived quality rating.

use std::sync::Arc;

use assert_matches::assert_matches;
use revq_api::config::ServerConfig;
use revq_api::engine::assignment::assign_item;
use revq_api::engine::decision::{decide, DecisionRequest};
use revq_api::error::AppError;
use revq_api::state::AppState;
use revq_core::actor::{Actor, Permission, ReviewerId, ReviewerLevel};
use revq_core::decision::{CategoryScores, DecisionKind};
use revq_core::error::CoreError;
use revq_db::models::{CreateReviewItem, CreateReviewer};
use revq_db::repositories::{AssignmentRepo, ReviewItemRepo, ReviewerRepo};
use sqlx::PgPool;

fn test_state(pool: PgPool) -> AppState {
    AppState {
        pool,
        config: Arc::new(ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec![],
            request_timeout_secs: 30,
            workload_ceiling: 100,
            rebalance_interval_secs: 300,
            overload_factor: 1.5,
            batch_width: 4,
            score_window_days: 30,
            anonymizer_salt: "test-salt".to_string(),
        }),
        event_bus: Arc::new(revq_events::EventBus::default()),
        kv: Arc::new(revq_events::InMemoryKv::new()),
    }
}

async fn submit_item(pool: &PgPool, title: &str, priority: i32) -> revq_db::models::ReviewItem {
    ReviewItemRepo::create(
        pool,
        &CreateReviewItem {
            title: title.to_string(),
            category: "mathematics".to_string(),
            attachment_count: 4,
            total_size_bytes: 2048,
            priority,
            contributor_id: "contrib-e2e".to_string(),
            contributor_reputation: "established".to_string(),
        },
    )
    .await
    .expect("item insert failed")
}

#[sqlx::test(migrations = "../db/migrations")]
async fn submit_assign_decide_scenario(pool: PgPool) {
    let state = test_state(pool.clone());

    // Empty pool: the item persists but cannot be assigned.
    let orphan = submit_item(&pool, "Geometry pack", 2).await;
    let err = assign_item(&state, &orphan).await.unwrap_err();
    assert_matches!(err, AppError::Core(CoreError::NoEligibleReviewer));
    let still_pending = ReviewItemRepo::find_by_id(&pool, orphan.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(still_pending.status, "pending_review");

    // A reviewer joins; the next submission lands on them.
    ReviewerRepo::create(
        &pool,
        &CreateReviewer {
            id: "rev-e2e".to_string(),
            level: "experienced".to_string(),
            permissions: vec!["approve_items".to_string()],
        },
    )
    .await
    .unwrap();

    let item = submit_item(&pool, "Algebra drills", 3).await;
    let assignment = assign_item(&state, &item).await.unwrap();
    assert_eq!(assignment.reviewer_id, "rev-e2e");
    assert_eq!(assignment.status, "pending");
    assert_eq!(assignment.priority, 3);

    // Decide without an explicit quality rating: average 4.0 derives "good".
    let actor = Actor::new(
        ReviewerId::new("rev-e2e"),
        ReviewerLevel::Experienced,
        vec![Permission::ApproveItems],
    );
    let request = DecisionRequest {
        kind: DecisionKind::Approved,
        quality_rating: None,
        rationale: "clear and well organized".to_string(),
        suggestions: vec![],
        category_scores: CategoryScores {
            content_accuracy: 5,
            educational_value: 4,
            file_quality: 4,
            organization: 3,
            appropriateness: 4,
        },
    };
    let decision = decide(&state, &actor, assignment.id, &request).await.unwrap();
    assert_eq!(decision.kind, "approved");
    assert_eq!(decision.quality, "good");

    let decided_item = ReviewItemRepo::find_by_id(&pool, item.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(decided_item.status, "approved");

    let closed = AssignmentRepo::find_by_id(&pool, assignment.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(closed.status, "decided");
    assert!(closed.closed_at.is_some());

    // A retried decide observes the close instead of repeating it.
    let err = decide(&state, &actor, assignment.id, &request)
        .await
        .unwrap_err();
    assert_matches!(
        err,
        AppError::Core(CoreError::AlreadyDecided { assignment_id }) if assignment_id == assignment.id
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn decide_by_non_owner_is_rejected(pool: PgPool) {
    let state = test_state(pool.clone());

    for id in ["rev-owner", "rev-other"] {
        ReviewerRepo::create(
            &pool,
            &CreateReviewer {
                id: id.to_string(),
                level: "experienced".to_string(),
                permissions: vec!["approve_items".to_string()],
            },
        )
        .await
        .unwrap();
    }

    let item = submit_item(&pool, "Essay rubric", 2).await;
    let assignment = AssignmentRepo::create(&pool, item.id, "rev-owner", 2)
        .await
        .unwrap();

    let intruder = Actor::new(
        ReviewerId::new("rev-other"),
        ReviewerLevel::Experienced,
        vec![Permission::ApproveItems],
    );
    let request = DecisionRequest {
        kind: DecisionKind::Approved,
        quality_rating: None,
        rationale: String::new(),
        suggestions: vec![],
        category_scores: CategoryScores {
            content_accuracy: 4,
            educational_value: 4,
            file_quality: 4,
            organization: 4,
            appropriateness: 4,
        },
    };
    let err = decide(&state, &intruder, assignment.id, &request)
        .await
        .unwrap_err();
    assert_matches!(err, AppError::Core(CoreError::NotOwner { .. }));

    // The assignment is untouched.
    let unchanged = AssignmentRepo::find_by_id(&pool, assignment.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.status, "pending");
}
