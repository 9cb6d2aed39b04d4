//! Performance scoring: a pure function from a reviewer's decision history
//! to five normalized sub-scores, a weighted overall score, a recognition
//! tier, and a trend signal.
//!
//! Scores gate batch eligibility and feed informational leaderboards only;
//! nothing here ever triggers an automated decision. Transferred
//! assignments never appear in the input, only recorded decisions do.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::decision::{DecisionKind, QualityRating};
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Weights and thresholds
// ---------------------------------------------------------------------------

pub const WEIGHT_SPEED: f64 = 0.25;
pub const WEIGHT_QUALITY: f64 = 0.30;
pub const WEIGHT_CONSISTENCY: f64 = 0.20;
pub const WEIGHT_VOLUME: f64 = 0.15;
pub const WEIGHT_FEEDBACK: f64 = 0.10;

/// Healthy approval-rate band for the consistency sub-score.
const APPROVAL_BAND_LOW: f64 = 0.65;
const APPROVAL_BAND_HIGH: f64 = 0.90;

/// Latency spread (hours) at which time consistency bottoms out.
const LATENCY_SPREAD_FLOOR_HOURS: f64 = 48.0;

/// Default scoring window.
pub const DEFAULT_WINDOW_DAYS: u32 = 30;

/// Fewer active weeks than this reports trend as insufficient data.
const MIN_ACTIVE_WEEKS_FOR_TREND: usize = 3;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// One decision as seen by the scorer. A projection of the Decision record
/// with everything identity-bearing already stripped.
#[derive(Debug, Clone)]
pub struct DecisionSample {
    pub kind: DecisionKind,
    pub quality: QualityRating,
    /// Wall-clock hours from assignment to decision.
    pub latency_hours: f64,
    pub rationale_len: usize,
    pub suggestion_count: usize,
    pub decided_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Sub-scores
// ---------------------------------------------------------------------------

/// Speed sub-score from mean decide latency, bucketed.
pub fn speed_score(mean_latency_hours: f64) -> f64 {
    if mean_latency_hours <= 4.0 {
        1.0
    } else if mean_latency_hours <= 8.0 {
        0.8
    } else if mean_latency_hours <= 16.0 {
        0.6
    } else if mean_latency_hours <= 24.0 {
        0.4
    } else {
        0.2
    }
}

/// Quality sub-score: mean of the fixed rating values.
pub fn quality_score(ratings: &[QualityRating]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    ratings.iter().map(|r| r.numeric()).sum::<f64>() / ratings.len() as f64
}

/// Consistency sub-score.
///
/// 0.4 x approval-rate band + 0.4 x latency steadiness + 0.2 x fraction of
/// window weeks with at least one decision. Approval rates inside
/// [65%, 90%] score best; rubber-stamping (> 95%) and mass rejection
/// (< 50%) score worst.
pub fn consistency_score(
    approval_rate: f64,
    latency_stddev_hours: f64,
    active_weeks: usize,
    window_weeks: usize,
) -> f64 {
    let band = if (APPROVAL_BAND_LOW..=APPROVAL_BAND_HIGH).contains(&approval_rate) {
        1.0
    } else if approval_rate < 0.5 || approval_rate > 0.95 {
        0.4
    } else {
        0.7
    };
    let steadiness = (1.0 - latency_stddev_hours / LATENCY_SPREAD_FLOOR_HOURS).max(0.2);
    let presence = if window_weeks == 0 {
        0.0
    } else {
        (active_weeks as f64 / window_weeks as f64).clamp(0.0, 1.0)
    };
    0.4 * band + 0.4 * steadiness + 0.2 * presence
}

/// Volume sub-score, bucketed with window-specific thresholds.
pub fn volume_score(decision_count: usize, window_days: u32) -> f64 {
    let thresholds: [usize; 4] = if window_days <= 7 {
        [10, 5, 2, 1]
    } else {
        [30, 15, 5, 1]
    };
    if decision_count >= thresholds[0] {
        1.0
    } else if decision_count >= thresholds[1] {
        0.8
    } else if decision_count >= thresholds[2] {
        0.6
    } else if decision_count >= thresholds[3] {
        0.4
    } else {
        0.0
    }
}

/// Feedback-quality sub-score: 0.6 x rationale-length bucket + 0.4 x
/// normalized suggestion count.
pub fn feedback_score(mean_rationale_len: f64, mean_suggestions: f64) -> f64 {
    let length = if mean_rationale_len >= 200.0 {
        1.0
    } else if mean_rationale_len >= 100.0 {
        0.8
    } else if mean_rationale_len >= 50.0 {
        0.6
    } else {
        0.3
    };
    let suggestions = (mean_suggestions / 3.0).min(1.0);
    0.6 * length + 0.4 * suggestions
}

// ---------------------------------------------------------------------------
// Composite
// ---------------------------------------------------------------------------

/// The five sub-scores and the weighted overall score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceBreakdown {
    pub speed: f64,
    pub quality: f64,
    pub consistency: f64,
    pub volume: f64,
    pub feedback: f64,
    /// Weighted composite in [0, 100].
    pub overall: f64,
}

impl PerformanceBreakdown {
    fn zero() -> Self {
        Self {
            speed: 0.0,
            quality: 0.0,
            consistency: 0.0,
            volume: 0.0,
            feedback: 0.0,
            overall: 0.0,
        }
    }
}

/// Compute the full breakdown for a decision-history window.
///
/// `now` is passed in rather than read from the clock so identical inputs
/// always produce identical outputs.
pub fn compute_breakdown(
    samples: &[DecisionSample],
    window_days: u32,
    now: Timestamp,
) -> PerformanceBreakdown {
    if samples.is_empty() {
        return PerformanceBreakdown::zero();
    }

    let n = samples.len() as f64;
    let mean_latency = samples.iter().map(|s| s.latency_hours).sum::<f64>() / n;
    let variance = samples
        .iter()
        .map(|s| (s.latency_hours - mean_latency).powi(2))
        .sum::<f64>()
        / n;
    let stddev = variance.sqrt();

    let approvals = samples
        .iter()
        .filter(|s| s.kind == DecisionKind::Approved)
        .count() as f64;
    let approval_rate = approvals / n;

    let ratings: Vec<QualityRating> = samples.iter().map(|s| s.quality).collect();

    let window_weeks = (window_days as usize).div_ceil(7);
    let weekly = weekly_counts(samples, window_days, now);
    let active_weeks = weekly.iter().filter(|&&c| c > 0).count();

    let mean_rationale = samples.iter().map(|s| s.rationale_len as f64).sum::<f64>() / n;
    let mean_suggestions = samples
        .iter()
        .map(|s| s.suggestion_count as f64)
        .sum::<f64>()
        / n;

    let speed = speed_score(mean_latency);
    let quality = quality_score(&ratings);
    let consistency = consistency_score(approval_rate, stddev, active_weeks, window_weeks);
    let volume = volume_score(samples.len(), window_days);
    let feedback = feedback_score(mean_rationale, mean_suggestions);

    let overall = 100.0
        * (WEIGHT_SPEED * speed
            + WEIGHT_QUALITY * quality
            + WEIGHT_CONSISTENCY * consistency
            + WEIGHT_VOLUME * volume
            + WEIGHT_FEEDBACK * feedback);

    PerformanceBreakdown {
        speed,
        quality,
        consistency,
        volume,
        feedback,
        overall,
    }
}

/// Decision counts per window week, index 0 being the most recent week.
pub fn weekly_counts(samples: &[DecisionSample], window_days: u32, now: Timestamp) -> Vec<u32> {
    let weeks = (window_days as usize).div_ceil(7);
    let mut counts = vec![0u32; weeks];
    for sample in samples {
        let age_days = (now - sample.decided_at).num_days();
        if age_days < 0 {
            continue;
        }
        let bucket = (age_days / 7) as usize;
        if bucket < weeks {
            counts[bucket] += 1;
        }
    }
    counts
}

// ---------------------------------------------------------------------------
// Recognition tiers
// ---------------------------------------------------------------------------

/// Recognition tier derived from the overall score. Below bronze a
/// reviewer is simply unranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognitionTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
}

impl RecognitionTier {
    pub fn label(&self) -> &'static str {
        match self {
            RecognitionTier::Bronze => "bronze",
            RecognitionTier::Silver => "silver",
            RecognitionTier::Gold => "gold",
            RecognitionTier::Platinum => "platinum",
            RecognitionTier::Diamond => "diamond",
        }
    }
}

/// Highest tier threshold met by an overall score.
pub fn recognition_tier(overall: f64) -> Option<RecognitionTier> {
    if overall >= 95.0 {
        Some(RecognitionTier::Diamond)
    } else if overall >= 90.0 {
        Some(RecognitionTier::Platinum)
    } else if overall >= 80.0 {
        Some(RecognitionTier::Gold)
    } else if overall >= 70.0 {
        Some(RecognitionTier::Silver)
    } else if overall >= 60.0 {
        Some(RecognitionTier::Bronze)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Trend
// ---------------------------------------------------------------------------

/// Direction of a reviewer's weekly decision volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Declining,
    Stable,
    InsufficientData,
}

/// Compare the recent half of the weekly counts against the earlier half.
/// Under [`MIN_ACTIVE_WEEKS_FOR_TREND`] active weeks the answer is
/// `InsufficientData` rather than a misleadingly precise direction.
pub fn compute_trend(weekly: &[u32]) -> Trend {
    let active = weekly.iter().filter(|&&c| c > 0).count();
    if active < MIN_ACTIVE_WEEKS_FOR_TREND {
        return Trend::InsufficientData;
    }
    // Index 0 is the most recent week.
    let mid = weekly.len() / 2;
    let recent: f64 = weekly[..mid].iter().map(|&c| c as f64).sum::<f64>() / mid.max(1) as f64;
    let earlier: f64 = weekly[mid..].iter().map(|&c| c as f64).sum::<f64>()
        / (weekly.len() - mid).max(1) as f64;
    if recent > earlier * 1.1 {
        Trend::Improving
    } else if recent < earlier * 0.9 {
        Trend::Declining
    } else {
        Trend::Stable
    }
}

// ---------------------------------------------------------------------------
// Anonymization
// ---------------------------------------------------------------------------

/// Derive the anonymized token published on leaderboards: the first 16 hex
/// characters of sha256("reviewer_id:salt"). One-way by construction.
pub fn anonymize_reviewer(reviewer_id: &str, salt: &str) -> String {
    let digest = Sha256::digest(format!("{reviewer_id}:{salt}").as_bytes());
    digest
        .iter()
        .take(8)
        .map(|b| format!("{b:02x}"))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
