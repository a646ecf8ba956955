//! Regular / irregular cycle outlook.
//!
//! Wraps the engine output in an explicit variant so consumers match on the
//! kind of prediction instead of probing optional fields:
//! - `Regular`: a single expected start date (with or without statistics)
//! - `Irregular`: a window of possible start dates

use crate::stats::{analyze, compute_weighted_mean};
use crate::{CycleObservation, CycleStatisticsResult};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Days before ovulation that still count as fertile
const FERTILE_DAYS_BEFORE_OVULATION: i64 = 5;

/// Days before ovulation that count as peak fertility
const PEAK_DAYS_BEFORE_OVULATION: i64 = 2;

/// Cycle history that is either too short to model or regular enough for a
/// fixed-interval prediction
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RegularCycle {
    /// Expected cycle length in days (28 without history)
    pub cycle_length: u32,
    /// Expected start of the next period, if any cycle has been recorded
    pub next_period: Option<NaiveDate>,
    pub observed_cycles: usize,
    /// Present once the history is long enough for analysis
    pub statistics: Option<CycleStatisticsResult>,
}

/// Cycle history too variable for a single expected date
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct IrregularCycle {
    pub observed_cycles: usize,
    pub statistics: CycleStatisticsResult,
}

/// What a cycle history says about the next period
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "pattern", rename_all = "snake_case")]
pub enum CycleOutlook {
    Regular(RegularCycle),
    Irregular(IrregularCycle),
}

/// Estimated fertile window ahead of the next period
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FertilityWindow {
    pub fertile_start: NaiveDate,
    pub fertile_end: NaiveDate,
    pub ovulation_day: NaiveDate,
    pub peak_start: NaiveDate,
    pub peak_end: NaiveDate,
}

impl CycleOutlook {
    /// Classify an ordered (oldest → newest) cycle history
    pub fn from_history(observations: &[CycleObservation]) -> Self {
        let observed_cycles = observations.len();
        let anchor = observations.last().map(|obs| obs.end_date);

        match analyze(observations) {
            Some(statistics) if statistics.is_irregular => {
                tracing::info!(
                    "Irregular cycle history (std dev {:.1} days over {} cycles)",
                    statistics.std_dev,
                    observed_cycles
                );
                CycleOutlook::Irregular(IrregularCycle {
                    observed_cycles,
                    statistics,
                })
            }
            Some(statistics) => CycleOutlook::Regular(RegularCycle {
                cycle_length: statistics.mean,
                next_period: anchor.map(|end| end + Duration::days(statistics.mean as i64)),
                observed_cycles,
                statistics: Some(statistics),
            }),
            None => {
                let cycle_length = compute_weighted_mean(observations);
                CycleOutlook::Regular(RegularCycle {
                    cycle_length,
                    next_period: anchor.map(|end| end + Duration::days(cycle_length as i64)),
                    observed_cycles,
                    statistics: None,
                })
            }
        }
    }

    pub fn is_irregular(&self) -> bool {
        matches!(self, CycleOutlook::Irregular(_))
    }

    pub fn observed_cycles(&self) -> usize {
        match self {
            CycleOutlook::Regular(regular) => regular.observed_cycles,
            CycleOutlook::Irregular(irregular) => irregular.observed_cycles,
        }
    }

    /// Engine statistics, when the history was long enough to analyze
    pub fn statistics(&self) -> Option<&CycleStatisticsResult> {
        match self {
            CycleOutlook::Regular(regular) => regular.statistics.as_ref(),
            CycleOutlook::Irregular(irregular) => Some(&irregular.statistics),
        }
    }

    /// Earliest and latest expected start of the next period
    ///
    /// Both ends are the same day for a regular outlook.
    pub fn expected_window(&self) -> Option<(NaiveDate, NaiveDate)> {
        match self {
            CycleOutlook::Regular(regular) => regular.next_period.map(|day| (day, day)),
            CycleOutlook::Irregular(irregular) => {
                let range = &irregular.statistics.predicted_range;
                Some((range.min_date, range.max_date))
            }
        }
    }

    /// Days from `today` until the earliest expected start
    ///
    /// Negative once the expected start has passed.
    pub fn days_until_next_period(&self, today: NaiveDate) -> Option<i64> {
        self.expected_window()
            .map(|(earliest, _)| (earliest - today).num_days())
    }

    /// Fertile window assuming ovulation `luteal_phase_days` before the
    /// next period.
    ///
    /// For an irregular outlook the window stretches from the earliest
    /// possible ovulation to the latest.
    pub fn fertility_window(&self, luteal_phase_days: u32) -> Option<FertilityWindow> {
        let (earliest, latest) = self.expected_window()?;
        let luteal = Duration::days(luteal_phase_days as i64);

        let ovulation_day = earliest - luteal;
        let last_ovulation = latest - luteal;

        Some(FertilityWindow {
            fertile_start: ovulation_day - Duration::days(FERTILE_DAYS_BEFORE_OVULATION),
            fertile_end: last_ovulation,
            ovulation_day,
            peak_start: ovulation_day - Duration::days(PEAK_DAYS_BEFORE_OVULATION),
            peak_end: last_ovulation,
        })
    }
}
