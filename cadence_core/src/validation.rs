//! Validation of cycle observations before they reach the engine.
//!
//! The statistics engine assumes its input is in range; this is the layer
//! that makes that true for anything read from disk.

use crate::{CycleObservation, Error, Result};
use chrono::NaiveDate;
use std::ops::RangeInclusive;

/// Accepted cycle lengths in days
pub const CYCLE_LENGTH_RANGE: RangeInclusive<u32> = 21..=45;

/// Accepted period durations in days
pub const PERIOD_DURATION_RANGE: RangeInclusive<u32> = 1..=10;

/// Check a single observation against its recorded constraints
///
/// Rules:
/// 1. Cycle length within [`CYCLE_LENGTH_RANGE`]
/// 2. Period duration within [`PERIOD_DURATION_RANGE`] and not longer than the cycle
/// 3. `end_date` after `start_date`, exactly `cycle_length` days later
pub fn validate_observation(obs: &CycleObservation) -> Result<()> {
    if !CYCLE_LENGTH_RANGE.contains(&obs.cycle_length) {
        return Err(Error::Validation(format!(
            "cycle length {} outside {}-{} days",
            obs.cycle_length,
            CYCLE_LENGTH_RANGE.start(),
            CYCLE_LENGTH_RANGE.end()
        )));
    }

    if !PERIOD_DURATION_RANGE.contains(&obs.period_duration) {
        return Err(Error::Validation(format!(
            "period duration {} outside {}-{} days",
            obs.period_duration,
            PERIOD_DURATION_RANGE.start(),
            PERIOD_DURATION_RANGE.end()
        )));
    }

    if obs.period_duration > obs.cycle_length {
        return Err(Error::Validation(format!(
            "period duration {} longer than cycle length {}",
            obs.period_duration, obs.cycle_length
        )));
    }

    if obs.end_date <= obs.start_date {
        return Err(Error::Validation(format!(
            "end date {} is not after start date {}",
            obs.end_date, obs.start_date
        )));
    }

    let span = (obs.end_date - obs.start_date).num_days();
    if span != obs.cycle_length as i64 {
        return Err(Error::Validation(format!(
            "cycle length {} does not match {} days between {} and {}",
            obs.cycle_length, span, obs.start_date, obs.end_date
        )));
    }

    Ok(())
}

impl CycleObservation {
    /// Build a validated observation from two consecutive period starts
    pub fn from_dates(
        start_date: NaiveDate,
        next_start: NaiveDate,
        period_duration: u32,
    ) -> Result<Self> {
        let days = (next_start - start_date).num_days();
        let cycle_length = u32::try_from(days).map_err(|_| {
            Error::Validation(format!(
                "next period {} precedes start {}",
                next_start, start_date
            ))
        })?;

        let obs = CycleObservation {
            start_date,
            end_date: next_start,
            cycle_length,
            period_duration,
        };
        validate_observation(&obs)?;
        Ok(obs)
    }
}
