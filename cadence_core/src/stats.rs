//! Cycle statistics engine.
//!
//! Turns an ordered cycle history into a recency-weighted mean, a
//! variability estimate, a confidence score and a predicted window for the
//! next period.
//!
//! Every function here is pure and total. The building blocks fall back to
//! fixed values on degenerate input (no history, a single cycle), while
//! [`analyze`] refuses to produce a prediction below [`MIN_OBSERVATIONS`].
//!
//! The numeric constants are calibration values carried over unchanged from
//! the product's existing behaviour. Changing them changes every prediction
//! users see.

use crate::{CycleObservation, CycleStatisticsResult, PredictedRange};
use chrono::Duration;

/// Population-average cycle length used before any history exists
pub const FALLBACK_CYCLE_LENGTH: u32 = 28;

/// Standard deviation (days) above which a history is irregular
pub const IRREGULARITY_THRESHOLD: f64 = 7.0;

/// Minimum history length for [`analyze`] to return a prediction
pub const MIN_OBSERVATIONS: usize = 3;

/// History length at which confidence switches to the blended formula
pub const FULL_CONFIDENCE_OBSERVATIONS: usize = 6;

/// Confidence reported for fewer than [`MIN_OBSERVATIONS`] cycles
pub const SPARSE_CONFIDENCE: u8 = 30;

/// Confidence reported for 3-5 cycles
pub const MODERATE_CONFIDENCE: u8 = 50;

/// Confidence points lost per day of standard deviation
pub const CONSISTENCY_PENALTY: f64 = 8.0;

pub const CONSISTENCY_WEIGHT: f64 = 0.7;
pub const DATA_WEIGHT: f64 = 0.3;

/// Standard deviations either side of the mean covered by the predicted range
pub const RANGE_SPREAD: f64 = 1.5;

/// Shortest cycle length the predicted range may report
pub const MIN_CYCLE_LENGTH: u32 = 21;

/// Longest cycle length the predicted range may report
pub const MAX_CYCLE_LENGTH: u32 = 45;

/// Recency-weighted mean cycle length, rounded to whole days.
///
/// The observation at index `i` gets weight `i + 1`, so the most recent
/// cycle counts `n` times as much as the oldest. Returns
/// [`FALLBACK_CYCLE_LENGTH`] for an empty history.
pub fn compute_weighted_mean(observations: &[CycleObservation]) -> u32 {
    if observations.is_empty() {
        return FALLBACK_CYCLE_LENGTH;
    }

    let (weighted_sum, weight_total) = observations.iter().enumerate().fold(
        (0.0_f64, 0.0_f64),
        |(sum, total), (i, obs)| {
            let weight = (i + 1) as f64;
            (sum + obs.cycle_length as f64 * weight, total + weight)
        },
    );

    (weighted_sum / weight_total).round() as u32
}

/// Sample standard deviation of cycle lengths around `mean`.
///
/// Divides by `n - 1`. Returns 0 for fewer than two observations. The mean
/// is whatever the caller supplies; nothing is recomputed here.
pub fn compute_std_dev(observations: &[CycleObservation], mean: f64) -> f64 {
    if observations.len() < 2 {
        return 0.0;
    }

    let squared_deviations: f64 = observations
        .iter()
        .map(|obs| (obs.cycle_length as f64 - mean).powi(2))
        .sum();

    (squared_deviations / (observations.len() - 1) as f64).sqrt()
}

/// Whether a history with this standard deviation counts as irregular.
///
/// Strictly greater than [`IRREGULARITY_THRESHOLD`].
pub fn classify_irregularity(std_dev: f64) -> bool {
    std_dev > IRREGULARITY_THRESHOLD
}

/// Confidence score in [0, 100] for a prediction built from this history.
///
/// Below [`MIN_OBSERVATIONS`] cycles the score is [`SPARSE_CONFIDENCE`], up
/// to five cycles it is [`MODERATE_CONFIDENCE`]. From six cycles on it blends
/// a consistency score (`100 - 8 * std_dev`, floored at 0) with a data score
/// that saturates at six cycles, weighted 0.7 / 0.3.
pub fn compute_confidence(observations: &[CycleObservation], std_dev: f64) -> u8 {
    let count = observations.len();

    if count < MIN_OBSERVATIONS {
        return SPARSE_CONFIDENCE;
    }
    if count < FULL_CONFIDENCE_OBSERVATIONS {
        return MODERATE_CONFIDENCE;
    }

    let consistency_score = (100.0 - std_dev * CONSISTENCY_PENALTY).max(0.0);
    let data_score = (count as f64 / FULL_CONFIDENCE_OBSERVATIONS as f64 * 100.0).min(100.0);

    let blended = CONSISTENCY_WEIGHT * consistency_score + DATA_WEIGHT * data_score;
    blended.round().clamp(0.0, 100.0) as u8
}

/// Predicted window for the next period, anchored on the latest cycle.
///
/// The window is `mean ± 1.5 * std_dev` days after `last.end_date`, with
/// both bounds kept inside [21, 45] days.
pub fn predict_period_range(
    last: &CycleObservation,
    mean: f64,
    std_dev: f64,
) -> PredictedRange {
    let min = clamp_cycle_length(mean - RANGE_SPREAD * std_dev);
    let max = clamp_cycle_length(mean + RANGE_SPREAD * std_dev);

    PredictedRange {
        min,
        max,
        min_date: last.end_date + Duration::days(min as i64),
        max_date: last.end_date + Duration::days(max as i64),
    }
}

fn clamp_cycle_length(days: f64) -> u32 {
    // NaN survives clamp and would cast to 0
    if days.is_nan() {
        return FALLBACK_CYCLE_LENGTH;
    }
    days.round()
        .clamp(MIN_CYCLE_LENGTH as f64, MAX_CYCLE_LENGTH as f64) as u32
}

/// Full statistical analysis of a cycle history.
///
/// Returns `None` when fewer than [`MIN_OBSERVATIONS`] cycles are supplied:
/// callers must then fall back to regular-cycle behaviour instead of showing
/// a statistical prediction.
pub fn analyze(observations: &[CycleObservation]) -> Option<CycleStatisticsResult> {
    if observations.len() < MIN_OBSERVATIONS {
        tracing::debug!(
            "Insufficient history for analysis: {} cycles (need {})",
            observations.len(),
            MIN_OBSERVATIONS
        );
        return None;
    }

    let last = observations.last()?;

    let mean = compute_weighted_mean(observations);
    let std_dev = compute_std_dev(observations, mean as f64);
    let is_irregular = classify_irregularity(std_dev);
    let confidence = compute_confidence(observations, std_dev);
    let predicted_range = predict_period_range(last, mean as f64, std_dev);

    tracing::debug!(
        "Analyzed {} cycles: mean={} std_dev={:.2} confidence={} irregular={}",
        observations.len(),
        mean,
        std_dev,
        confidence,
        is_irregular
    );

    Some(CycleStatisticsResult {
        mean,
        std_dev,
        confidence,
        predicted_range,
        is_irregular,
    })
}
