#![forbid(unsafe_code)]

//! Core domain model and statistics for the cadence cycle tracker.
//!
//! This crate provides:
//! - Domain types (cycle observations, statistics, predicted ranges)
//! - The cycle statistics engine
//! - Regular / irregular outlook with countdown and fertile window
//! - Observation validation and history file loading
//! - Configuration and logging

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod validation;
pub mod stats;
pub mod outlook;
pub mod history;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use stats::{
    analyze, classify_irregularity, compute_confidence, compute_std_dev, compute_weighted_mean,
    predict_period_range,
};
pub use outlook::{CycleOutlook, FertilityWindow, IrregularCycle, RegularCycle};
pub use validation::validate_observation;
pub use history::{load_history, load_observations, summarize, HistoryLoad, HistorySummary};
