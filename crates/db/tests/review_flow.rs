//! Integration tests for the review flow's store-level guarantees:
//! migration bootstrap, the guarded close under concurrency, and the
//! single-pending-assignment invariant.

use revq_db::models::{CreateDecision, CreateReviewItem};
use revq_db::repositories::{AssignmentRepo, DecisionRepo, ReviewItemRepo, ReviewerRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn create_reviewer(pool: &PgPool, id: &str) -> String {
    let reviewer = ReviewerRepo::create(
        pool,
        &revq_db::models::CreateReviewer {
            id: id.to_string(),
            level: "experienced".to_string(),
            permissions: vec!["approve_items".to_string()],
        },
    )
    .await
    .expect("reviewer insert failed");
    reviewer.id
}

async fn create_item(pool: &PgPool, title: &str, priority: i32) -> i64 {
    let item = ReviewItemRepo::create(
        pool,
        &CreateReviewItem {
            title: title.to_string(),
            category: "mathematics".to_string(),
            attachment_count: 4,
            total_size_bytes: 1024,
            priority,
            contributor_id: "contrib-1".to_string(),
            contributor_reputation: "established".to_string(),
        },
    )
    .await
    .expect("item insert failed");
    item.id
}

fn decision_input(assignment_id: i64, item_id: i64, reviewer_id: &str) -> CreateDecision {
    CreateDecision {
        assignment_id,
        item_id,
        reviewer_id: reviewer_id.to_string(),
        kind: "approved".to_string(),
        quality: "good".to_string(),
        rationale: "solid work".to_string(),
        suggestions: vec![],
        score_content_accuracy: 4,
        score_educational_value: 4,
        score_file_quality: 4,
        score_organization: 4,
        score_appropriateness: 4,
        latency_hours: 2.5,
    }
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn bootstrap_and_basic_flow(pool: PgPool) {
    revq_db::health_check(&pool).await.unwrap();

    let reviewer = create_reviewer(&pool, "rev-a").await;
    let item_id = create_item(&pool, "Fractions worksheet", 3).await;

    let assignment = AssignmentRepo::create(&pool, item_id, &reviewer, 3)
        .await
        .unwrap();
    assert_eq!(assignment.status, "pending");

    let queue = AssignmentRepo::list_pending_for_reviewer(&pool, &reviewer)
        .await
        .unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].item_id, item_id);
}

// ---------------------------------------------------------------------------
// Guarded close
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn second_close_observes_missed_update(pool: PgPool) {
    let reviewer = create_reviewer(&pool, "rev-a").await;
    let item_id = create_item(&pool, "Essay pack", 2).await;
    let assignment = AssignmentRepo::create(&pool, item_id, &reviewer, 2)
        .await
        .unwrap();

    let mut tx = pool.begin().await.unwrap();
    let closed = AssignmentRepo::close_pending(&mut tx, assignment.id, "decided")
        .await
        .unwrap();
    assert!(closed.is_some());
    DecisionRepo::insert(&mut tx, &decision_input(assignment.id, item_id, &reviewer))
        .await
        .unwrap();
    ReviewItemRepo::set_status(&mut tx, item_id, "approved")
        .await
        .unwrap();
    tx.commit().await.unwrap();

    // A retried decide must observe the close, not repeat it.
    let mut tx = pool.begin().await.unwrap();
    let again = AssignmentRepo::close_pending(&mut tx, assignment.id, "decided")
        .await
        .unwrap();
    assert!(again.is_none());
    tx.rollback().await.unwrap();

    let decision = DecisionRepo::find_by_assignment(&pool, assignment.id)
        .await
        .unwrap();
    assert!(decision.is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn concurrent_decides_have_one_winner(pool: PgPool) {
    let reviewer = create_reviewer(&pool, "rev-a").await;
    let item_id = create_item(&pool, "Lab report", 4).await;
    let assignment = AssignmentRepo::create(&pool, item_id, &reviewer, 4)
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..10 {
        let pool = pool.clone();
        let reviewer = reviewer.clone();
        let assignment_id = assignment.id;
        handles.push(tokio::spawn(async move {
            let mut tx = pool.begin().await.unwrap();
            let closed = AssignmentRepo::close_pending(&mut tx, assignment_id, "decided")
                .await
                .unwrap();
            match closed {
                Some(_) => {
                    DecisionRepo::insert(
                        &mut tx,
                        &decision_input(assignment_id, item_id, &reviewer),
                    )
                    .await
                    .unwrap();
                    ReviewItemRepo::set_status(&mut tx, item_id, "approved")
                        .await
                        .unwrap();
                    tx.commit().await.unwrap();
                    true
                }
                None => {
                    tx.rollback().await.unwrap();
                    false
                }
            }
        }));
    }

    let mut winners = 0;
    for handle in handles {
        if handle.await.unwrap() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1, "exactly one concurrent decide may win");

    // Exactly one decision row exists.
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM decisions WHERE assignment_id = $1")
        .bind(assignment.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn transfer_skips_decided_assignment(pool: PgPool) {
    let from = create_reviewer(&pool, "rev-a").await;
    let to = create_reviewer(&pool, "rev-b").await;
    let item_id = create_item(&pool, "Quiz bundle", 1).await;
    let assignment = AssignmentRepo::create(&pool, item_id, &from, 1)
        .await
        .unwrap();

    // A decide lands first.
    let mut tx = pool.begin().await.unwrap();
    AssignmentRepo::close_pending(&mut tx, assignment.id, "decided")
        .await
        .unwrap();
    DecisionRepo::insert(&mut tx, &decision_input(assignment.id, item_id, &from))
        .await
        .unwrap();
    tx.commit().await.unwrap();

    // The transfer loses the race and must skip.
    let mut tx = pool.begin().await.unwrap();
    let closed = AssignmentRepo::close_pending(&mut tx, assignment.id, "transferred")
        .await
        .unwrap();
    assert!(closed.is_none());
    tx.rollback().await.unwrap();

    // No new assignment was opened for the destination reviewer.
    let pending = AssignmentRepo::list_pending_for_reviewer(&pool, &to)
        .await
        .unwrap();
    assert!(pending.is_empty());
}

// ---------------------------------------------------------------------------
// Invariants and aggregates
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn only_one_pending_assignment_per_item(pool: PgPool) {
    let rev_a = create_reviewer(&pool, "rev-a").await;
    let rev_b = create_reviewer(&pool, "rev-b").await;
    let item_id = create_item(&pool, "Slide deck", 2).await;

    AssignmentRepo::create(&pool, item_id, &rev_a, 2).await.unwrap();
    let second = AssignmentRepo::create(&pool, item_id, &rev_b, 2).await;
    assert!(second.is_err(), "partial unique index must reject this");
}

#[sqlx::test(migrations = "./migrations")]
async fn workload_snapshot_sums_priorities(pool: PgPool) {
    let rev_a = create_reviewer(&pool, "rev-a").await;
    let rev_b = create_reviewer(&pool, "rev-b").await;

    for priority in [3, 1, 4] {
        let item_id = create_item(&pool, "item", priority).await;
        AssignmentRepo::create(&pool, item_id, &rev_a, priority)
            .await
            .unwrap();
    }

    let snapshots = ReviewerRepo::workload_snapshots(&pool).await.unwrap();
    assert_eq!(snapshots.len(), 2);

    let a = snapshots.iter().find(|s| s.reviewer_id == rev_a).unwrap();
    assert_eq!(a.pending_count, 3);
    assert_eq!(a.weighted_workload, 8);
    assert!(a.last_assigned_at.is_some());

    let b = snapshots.iter().find(|s| s.reviewer_id == rev_b).unwrap();
    assert_eq!(b.pending_count, 0);
    assert_eq!(b.weighted_workload, 0);
    assert!(b.last_assigned_at.is_none());
}
