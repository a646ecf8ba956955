//! Core domain types for cadence.
//!
//! This module defines the values that flow through the system:
//! - Cycle observations supplied by the history layer
//! - Statistics produced by the engine
//! - The predicted next-period range

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// Input
// ============================================================================

/// One completed menstrual cycle.
///
/// Histories are ordered oldest → newest; the engine relies on position,
/// not on the dates, for weighting and for finding the latest cycle.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CycleObservation {
    /// First day of flow for this cycle
    pub start_date: NaiveDate,
    /// First day of flow of the following cycle
    pub end_date: NaiveDate,
    /// Days between `start_date` and `end_date`, within [21, 45]
    pub cycle_length: u32,
    /// Days of active flow, within [1, 10]
    pub period_duration: u32,
}

// ============================================================================
// Output
// ============================================================================

/// Predicted window for the start of the next period
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PredictedRange {
    /// Earliest expected cycle length in days
    pub min: u32,
    /// Latest expected cycle length in days
    pub max: u32,
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
}

impl PredictedRange {
    /// Number of calendar days covered by the window, inclusive
    pub fn span_days(&self) -> u32 {
        self.max.saturating_sub(self.min) + 1
    }

    /// Check if a date falls within the predicted window
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.min_date && date <= self.max_date
    }
}

/// Result of analysing a cycle history.
///
/// Recomputed on every call; nothing here is persisted.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CycleStatisticsResult {
    /// Recency-weighted mean cycle length, rounded to whole days
    pub mean: u32,
    /// Sample standard deviation of cycle lengths
    pub std_dev: f64,
    /// Trust in the prediction, 0-100
    pub confidence: u8,
    pub predicted_range: PredictedRange,
    pub is_irregular: bool,
}
