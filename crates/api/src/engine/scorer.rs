//! Performance score computation over a reviewer's decision history.
//!
//! Only transferred-free decision records reach the scorer (transfers never
//! produce decisions), and only the anonymized token ever leaves this
//! module in leaderboard output.

use chrono::{Duration, Utc};
use revq_core::decision::{DecisionKind, QualityRating};
use revq_core::scoring::{
    anonymize_reviewer, compute_breakdown, compute_trend, recognition_tier, weekly_counts,
    DecisionSample, PerformanceBreakdown, RecognitionTier, Trend,
};
use revq_db::repositories::DecisionRepo;
use revq_db::DbPool;
use serde::Serialize;

use crate::error::{AppError, AppResult};

/// A reviewer's computed performance view.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceScore {
    /// Anonymized token, the only identifier fit for publication.
    pub reviewer_token: String,
    pub window_days: u32,
    pub decision_count: usize,
    pub breakdown: PerformanceBreakdown,
    pub tier: Option<RecognitionTier>,
    pub trend: Trend,
}

/// Compute the performance score for one reviewer over a trailing window.
pub async fn compute(
    pool: &DbPool,
    salt: &str,
    reviewer_id: &str,
    window_days: u32,
) -> AppResult<PerformanceScore> {
    let now = Utc::now();
    let since = now - Duration::days(window_days as i64);

    let rows = DecisionRepo::stats_for_reviewer(pool, reviewer_id, since).await?;

    let samples = rows
        .into_iter()
        .map(|row| {
            let kind = DecisionKind::from_label(&row.kind).ok_or_else(|| {
                AppError::InternalError(format!("Unknown decision kind '{}'", row.kind))
            })?;
            let quality = QualityRating::from_label(&row.quality).ok_or_else(|| {
                AppError::InternalError(format!("Unknown quality rating '{}'", row.quality))
            })?;
            Ok(DecisionSample {
                kind,
                quality,
                latency_hours: row.latency_hours,
                rationale_len: row.rationale_len.max(0) as usize,
                suggestion_count: row.suggestion_count.max(0) as usize,
                decided_at: row.decided_at,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    let breakdown = compute_breakdown(&samples, window_days, now);
    let weekly = weekly_counts(&samples, window_days, now);
    let trend = compute_trend(&weekly);
    let tier = recognition_tier(breakdown.overall);

    Ok(PerformanceScore {
        reviewer_token: anonymize_reviewer(reviewer_id, salt),
        window_days,
        decision_count: samples.len(),
        breakdown,
        tier,
        trend,
    })
}

/// Leaderboard: scores for every reviewer active in the window, highest
/// overall first, capped at `limit`.
pub async fn leaderboard(
    pool: &DbPool,
    salt: &str,
    window_days: u32,
    limit: usize,
) -> AppResult<Vec<PerformanceScore>> {
    let since = Utc::now() - Duration::days(window_days as i64);
    let reviewer_ids = DecisionRepo::reviewers_with_decisions_since(pool, since).await?;

    let mut scores = Vec::with_capacity(reviewer_ids.len());
    for reviewer_id in &reviewer_ids {
        scores.push(compute(pool, salt, reviewer_id, window_days).await?);
    }

    scores.sort_by(|a, b| {
        b.breakdown
            .overall
            .partial_cmp(&a.breakdown.overall)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scores.truncate(limit);
    Ok(scores)
}
