//! Cycle history loading.
//!
//! Reads cycle observations from a CSV or JSON file, validates each record
//! and returns them oldest first, ready for the statistics engine. Bad
//! records are reported back rather than failing the whole load.

use crate::validation::validate_observation;
use crate::{CycleObservation, Error, Result};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// On-disk record format, shared by CSV rows and JSON entries
#[derive(Debug, Deserialize)]
struct HistoryRecord {
    start_date: NaiveDate,
    end_date: NaiveDate,
    /// Derived from the dates when blank
    #[serde(default)]
    cycle_length: Option<u32>,
    period_duration: u32,
}

impl TryFrom<HistoryRecord> for CycleObservation {
    type Error = Error;

    fn try_from(record: HistoryRecord) -> Result<Self> {
        match record.cycle_length {
            Some(cycle_length) => {
                let obs = CycleObservation {
                    start_date: record.start_date,
                    end_date: record.end_date,
                    cycle_length,
                    period_duration: record.period_duration,
                };
                validate_observation(&obs)?;
                Ok(obs)
            }
            None => CycleObservation::from_dates(
                record.start_date,
                record.end_date,
                record.period_duration,
            ),
        }
    }
}

/// A record that was skipped while loading
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct RejectedRecord {
    /// CSV line number, or 1-based entry index for JSON
    pub line: usize,
    pub reason: String,
}

/// Outcome of reading a history file
#[derive(Clone, Debug, Default)]
pub struct HistoryLoad {
    /// Valid observations, oldest first
    pub observations: Vec<CycleObservation>,
    pub rejected: Vec<RejectedRecord>,
}

/// Aggregate figures over a whole history
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct HistorySummary {
    pub total_cycles: usize,
    pub average_cycle_length: Option<f64>,
    pub average_period_duration: Option<f64>,
    pub shortest_cycle: Option<u32>,
    pub longest_cycle: Option<u32>,
    pub last_period_start: Option<NaiveDate>,
    /// Start of the period that closed the latest cycle
    pub latest_cycle_end: Option<NaiveDate>,
}

/// Load a cycle history, keeping track of rejected records
///
/// The format is picked from the extension: `.json` for a JSON array of
/// records, anything else is read as CSV with a header row. A missing file
/// is an empty history.
pub fn load_history(path: &Path) -> Result<HistoryLoad> {
    if !path.exists() {
        tracing::debug!("No history file found at {:?}", path);
        return Ok(HistoryLoad::default());
    }

    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let parsed = if is_json {
        read_json_records(path)?
    } else {
        read_csv_records(path)?
    };

    let mut load = HistoryLoad::default();
    let mut seen_starts = HashSet::new();

    for (line, record) in parsed {
        let outcome = record.and_then(|r| {
            let obs = CycleObservation::try_from(r)?;
            if !seen_starts.insert(obs.start_date) {
                return Err(Error::History(format!(
                    "duplicate cycle starting {}",
                    obs.start_date
                )));
            }
            Ok(obs)
        });

        match outcome {
            Ok(obs) => load.observations.push(obs),
            Err(e) => {
                tracing::warn!("Skipping history record {}: {}", line, e);
                load.rejected.push(RejectedRecord {
                    line,
                    reason: e.to_string(),
                });
            }
        }
    }

    // Position is what the engine weights on, so restore chronological order
    load.observations.sort_by_key(|obs| obs.start_date);

    for pair in load.observations.windows(2) {
        if pair[0].end_date > pair[1].start_date {
            tracing::warn!(
                "Cycle starting {} overlaps the cycle starting {}",
                pair[0].start_date,
                pair[1].start_date
            );
        }
    }

    tracing::info!(
        "Loaded {} cycles from {:?} ({} rejected)",
        load.observations.len(),
        path,
        load.rejected.len()
    );

    Ok(load)
}

/// Load only the valid observations from a history file, oldest first
pub fn load_observations(path: &Path) -> Result<Vec<CycleObservation>> {
    Ok(load_history(path)?.observations)
}

fn read_csv_records(path: &Path) -> Result<Vec<(usize, Result<HistoryRecord>)>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_path(path)?;
    let headers: StringRecord = reader.headers()?.clone();

    let mut records = Vec::new();
    for result in reader.records() {
        match result {
            Ok(row) => {
                let line = row.position().map(|p| p.line() as usize).unwrap_or(0);
                let record = row
                    .deserialize::<HistoryRecord>(Some(&headers))
                    .map_err(Error::from);
                records.push((line, record));
            }
            Err(e) => {
                let line = e.position().map(|p| p.line() as usize).unwrap_or(0);
                records.push((line, Err(Error::from(e))));
            }
        }
    }

    Ok(records)
}

fn read_json_records(path: &Path) -> Result<Vec<(usize, Result<HistoryRecord>)>> {
    let contents = std::fs::read_to_string(path)?;
    let entries: Vec<serde_json::Value> = serde_json::from_str(&contents)?;

    Ok(entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| {
            let record = serde_json::from_value::<HistoryRecord>(entry).map_err(Error::from);
            (i + 1, record)
        })
        .collect())
}

/// Summarize a history (expects chronological order)
pub fn summarize(observations: &[CycleObservation]) -> HistorySummary {
    let total_cycles = observations.len();
    let average = |values: Vec<u32>| -> Option<f64> {
        if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<u32>() as f64 / values.len() as f64)
        }
    };

    HistorySummary {
        total_cycles,
        average_cycle_length: average(observations.iter().map(|o| o.cycle_length).collect()),
        average_period_duration: average(
            observations.iter().map(|o| o.period_duration).collect(),
        ),
        shortest_cycle: observations.iter().map(|o| o.cycle_length).min(),
        longest_cycle: observations.iter().map(|o| o.cycle_length).max(),
        last_period_start: observations.last().map(|o| o.start_date),
        latest_cycle_end: observations.last().map(|o| o.end_date),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_missing_file_is_empty_history() {
        let temp_dir = tempfile::tempdir().unwrap();
        let load = load_history(&temp_dir.path().join("nonexistent.csv")).unwrap();
        assert!(load.observations.is_empty());
        assert!(load.rejected.is_empty());
    }

    #[test]
    fn test_csv_sorted_oldest_first() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &temp_dir,
            "cycles.csv",
            "start_date,end_date,cycle_length,period_duration\n\
             2024-02-26,2024-03-25,28,5\n\
             2024-01-01,2024-01-29,,4\n\
             2024-01-29,2024-02-26,28,6\n",
        );

        let observations = load_observations(&path).unwrap();
        assert_eq!(observations.len(), 3);
        assert_eq!(observations[0].start_date, date("2024-01-01"));
        assert_eq!(observations[1].start_date, date("2024-01-29"));
        assert_eq!(observations[2].start_date, date("2024-02-26"));
        // blank cycle_length derived from the dates
        assert_eq!(observations[0].cycle_length, 28);
        assert_eq!(observations[0].period_duration, 4);
    }

    #[test]
    fn test_csv_invalid_rows_are_rejected() {
        crate::logging::init_test();

        let temp_dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &temp_dir,
            "cycles.csv",
            "start_date,end_date,cycle_length,period_duration\n\
             2024-01-01,2024-01-29,28,5\n\
             not-a-date,2024-02-26,28,5\n\
             2024-02-26,2024-03-10,13,5\n\
             2024-03-25,2024-04-22,28,15\n\
             2024-01-29,2024-02-26,28,5\n",
        );

        let load = load_history(&path).unwrap();
        assert_eq!(load.observations.len(), 2);

        let lines: Vec<usize> = load.rejected.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![3, 4, 5]);
        assert!(load.rejected[1].reason.contains("cycle length 13"));
        assert!(load.rejected[2].reason.contains("period duration 15"));
    }

    #[test]
    fn test_duplicate_start_dates_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &temp_dir,
            "cycles.csv",
            "start_date,end_date,cycle_length,period_duration\n\
             2024-01-01,2024-01-29,28,5\n\
             2024-01-01,2024-01-31,30,5\n",
        );

        let load = load_history(&path).unwrap();
        assert_eq!(load.observations.len(), 1);
        assert_eq!(load.observations[0].cycle_length, 28);
        assert_eq!(load.rejected.len(), 1);
        assert!(load.rejected[0].reason.contains("duplicate"));
    }

    #[test]
    fn test_json_history() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &temp_dir,
            "cycles.json",
            r#"[
                {"start_date": "2024-01-29", "end_date": "2024-02-26", "period_duration": 5},
                {"start_date": "2024-01-01", "end_date": "2024-01-29", "cycle_length": 28, "period_duration": 4},
                {"start_date": "2024-02-26", "period_duration": 4}
            ]"#,
        );

        let load = load_history(&path).unwrap();
        assert_eq!(load.observations.len(), 2);
        assert_eq!(load.observations[0].start_date, date("2024-01-01"));
        assert_eq!(load.observations[1].cycle_length, 28);
        assert_eq!(load.rejected.len(), 1);
        assert_eq!(load.rejected[0].line, 3);
    }

    #[test]
    fn test_json_must_be_array() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = write_file(&temp_dir, "cycles.json", r#"{"start_date": "2024-01-01"}"#);

        assert!(matches!(load_history(&path), Err(Error::Json(_))));
    }

    #[test]
    fn test_summarize() {
        let observations = vec![
            CycleObservation::from_dates(date("2024-01-01"), date("2024-01-27"), 4).unwrap(),
            CycleObservation::from_dates(date("2024-01-27"), date("2024-02-27"), 6).unwrap(),
        ];

        let summary = summarize(&observations);
        assert_eq!(summary.total_cycles, 2);
        assert_eq!(summary.average_cycle_length, Some(28.5));
        assert_eq!(summary.average_period_duration, Some(5.0));
        assert_eq!(summary.shortest_cycle, Some(26));
        assert_eq!(summary.longest_cycle, Some(31));
        assert_eq!(summary.last_period_start, Some(date("2024-01-27")));
        assert_eq!(summary.latest_cycle_end, Some(date("2024-02-27")));
    }

    #[test]
    fn test_summarize_empty() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_cycles, 0);
        assert_eq!(summary.average_cycle_length, None);
        assert_eq!(summary.last_period_start, None);
    }
}
