//! Workload math: weighted workload snapshots, reviewer selection for new
//! assignments, queue ordering, and the rebalancing planner.
//!
//! Everything here is pure. The API engine feeds these functions snapshots
//! read from the store and executes the returned plans with atomic guarded
//! updates, so planning never has to hold locks.

use std::cmp::Ordering;

use crate::actor::ReviewerId;
use crate::item::MAX_ITEM_TRANSFERS;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Absolute weighted-workload ceiling above which a reviewer receives no
/// new assignments. Weighted workload is the sum of priority levels across
/// pending assignments, so 100 is roughly 25-100 items depending on mix.
pub const DEFAULT_WORKLOAD_CEILING: i64 = 100;

/// A reviewer is considered overloaded when their weighted workload exceeds
/// this multiple of the population mean.
pub const DEFAULT_OVERLOAD_FACTOR: f64 = 1.5;

/// Upper bound on transfers in a single rebalancing run.
pub const MAX_TRANSFERS_PER_RUN: usize = 25;

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// Point-in-time view of one reviewer's pending workload. Derived from the
/// store on demand, never persisted.
#[derive(Debug, Clone)]
pub struct WorkloadSnapshot {
    pub reviewer_id: ReviewerId,
    /// Number of pending assignments.
    pub pending_count: u32,
    /// Sum of priority levels across pending assignments.
    pub weighted_workload: i64,
    /// When the reviewer last received an assignment, if ever.
    pub last_assigned_at: Option<Timestamp>,
}

/// Mean weighted workload across a reviewer population.
pub fn mean_weighted_workload(snapshots: &[WorkloadSnapshot]) -> f64 {
    if snapshots.is_empty() {
        return 0.0;
    }
    snapshots.iter().map(|s| s.weighted_workload).sum::<i64>() as f64 / snapshots.len() as f64
}

// ---------------------------------------------------------------------------
// Assignment selection
// ---------------------------------------------------------------------------

/// Pick the reviewer to receive a new assignment.
///
/// Candidates must be below `ceiling`. Among candidates the lowest weighted
/// workload wins; ties break toward the reviewer who has gone longest
/// without a new assignment (never-assigned counts as oldest).
pub fn select_reviewer<'a>(
    snapshots: &'a [WorkloadSnapshot],
    ceiling: i64,
) -> Option<&'a WorkloadSnapshot> {
    snapshots
        .iter()
        .filter(|s| s.weighted_workload < ceiling)
        .min_by(|a, b| {
            a.weighted_workload
                .cmp(&b.weighted_workload)
                .then_with(|| cmp_last_assigned(a.last_assigned_at, b.last_assigned_at))
        })
}

fn cmp_last_assigned(a: Option<Timestamp>, b: Option<Timestamp>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.cmp(&b),
    }
}

// ---------------------------------------------------------------------------
// Queue ordering
// ---------------------------------------------------------------------------

/// Sort queue entries into presentation order: priority descending, then
/// assigned-at ascending (FIFO within a priority tier).
pub fn sort_queue<T>(entries: &mut [T], key: impl Fn(&T) -> (i32, Timestamp)) {
    entries.sort_by(|a, b| {
        let (pa, ta) = key(a);
        let (pb, tb) = key(b);
        pb.cmp(&pa).then_with(|| ta.cmp(&tb))
    });
}

// ---------------------------------------------------------------------------
// Rebalancing
// ---------------------------------------------------------------------------

/// A pending assignment that rebalancing may move.
#[derive(Debug, Clone)]
pub struct MovableAssignment {
    pub assignment_id: DbId,
    pub item_id: DbId,
    pub priority: i32,
    pub assigned_at: Timestamp,
    /// Lifetime transfer count for the underlying item.
    pub transfer_count: i32,
}

/// One planned move from an overloaded reviewer to a lighter one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedTransfer {
    pub assignment_id: DbId,
    pub item_id: DbId,
    pub from: ReviewerId,
    pub to: ReviewerId,
    pub priority: i32,
}

/// Plan a rebalancing pass.
///
/// Donors are reviewers above `overload_factor` times the population mean.
/// Each donor sheds its lowest-priority, oldest-assigned items first, one
/// at a time, to the currently lightest recipient below the pre-rebalance
/// mean, until the donor drops to the threshold or recipients run out.
///
/// Bounds: an item appears at most once per plan, items at the lifetime
/// transfer cap are skipped, and the whole plan is capped at
/// [`MAX_TRANSFERS_PER_RUN`]. The returned plan is advisory; execution
/// re-checks every move with the same atomic guard a decide uses, so a
/// concurrent decision simply causes that move to be skipped.
pub fn plan_rebalance(
    snapshots: &[WorkloadSnapshot],
    movable: impl Fn(&ReviewerId) -> Vec<MovableAssignment>,
    overload_factor: f64,
) -> Vec<PlannedTransfer> {
    let mean = mean_weighted_workload(snapshots);
    let threshold = mean * overload_factor;
    if snapshots.len() < 2 || mean == 0.0 {
        return Vec::new();
    }

    // Working copies of each reviewer's weighted workload.
    let mut weights: Vec<(ReviewerId, i64)> = snapshots
        .iter()
        .map(|s| (s.reviewer_id.clone(), s.weighted_workload))
        .collect();

    let mut donors: Vec<usize> = (0..weights.len())
        .filter(|&i| weights[i].1 as f64 > threshold)
        .collect();
    // Heaviest donors shed first.
    donors.sort_by(|&a, &b| weights[b].1.cmp(&weights[a].1));

    let mut plan = Vec::new();

    for donor_idx in donors {
        let donor_id = weights[donor_idx].0.clone();
        let mut items = movable(&donor_id);
        // Lowest priority first, oldest first within a priority.
        items.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| a.assigned_at.cmp(&b.assigned_at))
        });

        for item in items {
            if plan.len() >= MAX_TRANSFERS_PER_RUN {
                return plan;
            }
            if weights[donor_idx].1 as f64 <= threshold {
                break;
            }
            if item.transfer_count >= MAX_ITEM_TRANSFERS {
                continue;
            }

            // Lightest recipient still below the pre-rebalance mean.
            let recipient = (0..weights.len())
                .filter(|&i| i != donor_idx && (weights[i].1 as f64) < mean)
                .min_by_key(|&i| weights[i].1);
            let Some(recipient_idx) = recipient else {
                break;
            };

            weights[donor_idx].1 -= item.priority as i64;
            weights[recipient_idx].1 += item.priority as i64;
            plan.push(PlannedTransfer {
                assignment_id: item.assignment_id,
                item_id: item.item_id,
                from: donor_id.clone(),
                to: weights[recipient_idx].0.clone(),
                priority: item.priority,
            });
        }
    }

    plan
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn snapshot(id: &str, weighted: i64, last: Option<Timestamp>) -> WorkloadSnapshot {
        WorkloadSnapshot {
            reviewer_id: ReviewerId::new(id),
            pending_count: weighted as u32,
            weighted_workload: weighted,
            last_assigned_at: last,
        }
    }

    // -- select_reviewer -----------------------------------------------------

    #[test]
    fn selects_lowest_weighted_workload() {
        let snaps = vec![
            snapshot("a", 12, None),
            snapshot("b", 3, None),
            snapshot("c", 7, None),
        ];
        let picked = select_reviewer(&snaps, DEFAULT_WORKLOAD_CEILING).unwrap();
        assert_eq!(picked.reviewer_id, ReviewerId::new("b"));
    }

    #[test]
    fn tie_breaks_toward_longest_idle() {
        let now = Utc::now();
        let snaps = vec![
            snapshot("recent", 5, Some(now)),
            snapshot("idle", 5, Some(now - Duration::hours(10))),
            snapshot("fresh", 5, Some(now - Duration::minutes(1))),
        ];
        let picked = select_reviewer(&snaps, DEFAULT_WORKLOAD_CEILING).unwrap();
        assert_eq!(picked.reviewer_id, ReviewerId::new("idle"));
    }

    #[test]
    fn never_assigned_wins_ties() {
        let now = Utc::now();
        let snaps = vec![
            snapshot("veteran", 5, Some(now - Duration::days(30))),
            snapshot("rookie", 5, None),
        ];
        let picked = select_reviewer(&snaps, DEFAULT_WORKLOAD_CEILING).unwrap();
        assert_eq!(picked.reviewer_id, ReviewerId::new("rookie"));
    }

    #[test]
    fn everyone_at_ceiling_yields_none() {
        let snaps = vec![snapshot("a", 100, None), snapshot("b", 120, None)];
        assert!(select_reviewer(&snaps, 100).is_none());
    }

    #[test]
    fn empty_pool_yields_none() {
        assert!(select_reviewer(&[], DEFAULT_WORKLOAD_CEILING).is_none());
    }

    // -- sort_queue ------------------------------------------------------------

    #[test]
    fn queue_orders_priority_desc_then_fifo() {
        let t0 = Utc::now();
        let t = |n: i64| t0 + Duration::minutes(n);
        // Priorities [1,3,3,2] assigned at t1<t2<t3<t4.
        let mut entries = vec![(1, t(1)), (3, t(2)), (3, t(3)), (2, t(4))];
        sort_queue(&mut entries, |e| (e.0, e.1));
        assert_eq!(
            entries,
            vec![(3, t(2)), (3, t(3)), (2, t(4)), (1, t(1))]
        );
    }

    // -- plan_rebalance -------------------------------------------------------------

    fn movable_items(count: usize, priority: i32) -> Vec<MovableAssignment> {
        let t0 = Utc::now();
        (0..count)
            .map(|i| MovableAssignment {
                assignment_id: i as DbId + 1,
                item_id: i as DbId + 100,
                priority,
                assigned_at: t0 + Duration::minutes(i as i64),
                transfer_count: 0,
            })
            .collect()
    }

    #[test]
    fn rebalance_converges_overloaded_donor() {
        // Weighted workloads [50, 5, 5]: mean 20, threshold 30.
        let snaps = vec![
            snapshot("heavy", 50, None),
            snapshot("light1", 5, None),
            snapshot("light2", 5, None),
        ];
        let heavy = ReviewerId::new("heavy");
        let plan = plan_rebalance(
            &snaps,
            |id| {
                if *id == heavy {
                    movable_items(25, 2)
                } else {
                    Vec::new()
                }
            },
            DEFAULT_OVERLOAD_FACTOR,
        );

        let moved: i64 = plan.iter().map(|t| t.priority as i64).sum();
        assert!(50 - moved <= 30, "donor should end at or below threshold");

        // No recipient ends above the pre-rebalance maximum.
        let mut light1 = 5i64;
        let mut light2 = 5i64;
        for t in &plan {
            if t.to == ReviewerId::new("light1") {
                light1 += t.priority as i64;
            } else {
                light2 += t.priority as i64;
            }
        }
        assert!(light1 <= 50 && light2 <= 50);
        // Recipients were only fed while below the mean of 20.
        assert!(light1 <= 20 + 2 && light2 <= 20 + 2);
    }

    #[test]
    fn rebalance_moves_lowest_priority_oldest_first() {
        let snaps = vec![snapshot("heavy", 40, None), snapshot("light", 2, None)];
        let t0 = Utc::now();
        let heavy = ReviewerId::new("heavy");
        let items = vec![
            MovableAssignment {
                assignment_id: 1,
                item_id: 101,
                priority: 4,
                assigned_at: t0,
                transfer_count: 0,
            },
            MovableAssignment {
                assignment_id: 2,
                item_id: 102,
                priority: 1,
                assigned_at: t0 + Duration::minutes(5),
                transfer_count: 0,
            },
            MovableAssignment {
                assignment_id: 3,
                item_id: 103,
                priority: 1,
                assigned_at: t0,
                transfer_count: 0,
            },
        ];
        let plan = plan_rebalance(
            &snaps,
            |id| if *id == heavy { items.clone() } else { Vec::new() },
            DEFAULT_OVERLOAD_FACTOR,
        );
        assert!(!plan.is_empty());
        // Priority-1 assigned earliest goes first.
        assert_eq!(plan[0].assignment_id, 3);
    }

    #[test]
    fn items_at_transfer_cap_are_skipped() {
        let snaps = vec![snapshot("heavy", 40, None), snapshot("light", 2, None)];
        let heavy = ReviewerId::new("heavy");
        let mut items = movable_items(5, 3);
        for item in &mut items {
            item.transfer_count = MAX_ITEM_TRANSFERS;
        }
        let plan = plan_rebalance(
            &snaps,
            |id| if *id == heavy { items.clone() } else { Vec::new() },
            DEFAULT_OVERLOAD_FACTOR,
        );
        assert!(plan.is_empty());
    }

    #[test]
    fn balanced_population_plans_nothing() {
        let snaps = vec![snapshot("a", 10, None), snapshot("b", 11, None)];
        let plan = plan_rebalance(&snaps, |_| movable_items(5, 2), DEFAULT_OVERLOAD_FACTOR);
        assert!(plan.is_empty());
    }

    #[test]
    fn single_reviewer_plans_nothing() {
        let snaps = vec![snapshot("only", 80, None)];
        let plan = plan_rebalance(&snaps, |_| movable_items(20, 4), DEFAULT_OVERLOAD_FACTOR);
        assert!(plan.is_empty());
    }

    #[test]
    fn plan_respects_per_run_cap() {
        let snaps = vec![snapshot("heavy", 400, None), snapshot("light", 0, None)];
        let heavy = ReviewerId::new("heavy");
        let plan = plan_rebalance(
            &snaps,
            |id| {
                if *id == heavy {
                    movable_items(200, 1)
                } else {
                    Vec::new()
                }
            },
            DEFAULT_OVERLOAD_FACTOR,
        );
        assert!(plan.len() <= MAX_TRANSFERS_PER_RUN);
    }
}
