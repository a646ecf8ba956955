use cadence_core::history::RejectedRecord;
use cadence_core::stats::MIN_OBSERVATIONS;
use cadence_core::*;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "cadence")]
#[command(about = "Cycle statistics and next-period prediction", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override config file location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Cycle history file (CSV, or JSON with a .json extension)
    #[arg(long, global = true)]
    history: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict the next period (default)
    Predict {
        /// Date to count down from (YYYY-MM-DD), defaults to today
        #[arg(long)]
        today: Option<NaiveDate>,

        /// Include the estimated fertile window
        #[arg(long)]
        fertility: bool,
    },

    /// Show history summary and cycle statistics
    Stats,

    /// Validate the history file and list rejected records
    Check,
}

fn main() -> Result<()> {
    // Initialize logging
    cadence_core::logging::init();

    let Cli {
        command,
        config: config_path,
        history,
        json,
    } = Cli::parse();

    let config = match config_path {
        Some(path) => Config::load_from(&path)?,
        None => Config::load()?,
    };
    let history_path = history.unwrap_or_else(|| config.history_path());

    match command {
        Some(Commands::Predict { today, fertility }) => {
            cmd_predict(&history_path, today, fertility, json, &config)
        }
        Some(Commands::Stats) => cmd_stats(&history_path, json),
        Some(Commands::Check) => cmd_check(&history_path, json),
        None => {
            // Default to "predict" command
            cmd_predict(&history_path, None, false, json, &config)
        }
    }
}

#[derive(Serialize)]
struct PredictReport<'a> {
    today: NaiveDate,
    outlook: &'a CycleOutlook,
    days_until_next_period: Option<i64>,
    fertility: Option<FertilityWindow>,
}

fn cmd_predict(
    history_path: &Path,
    today: Option<NaiveDate>,
    fertility: bool,
    json: bool,
    config: &Config,
) -> Result<()> {
    let observations = load_observations(history_path)?;
    let outlook = CycleOutlook::from_history(&observations);

    let today = today.unwrap_or_else(|| chrono::Local::now().date_naive());
    let days_until = outlook.days_until_next_period(today);
    let fertility = if fertility || config.prediction.show_fertility {
        outlook.fertility_window(config.prediction.luteal_phase_days)
    } else {
        None
    };

    if json {
        let report = PredictReport {
            today,
            outlook: &outlook,
            days_until_next_period: days_until,
            fertility,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    display_outlook(&outlook, days_until);

    if let Some(window) = fertility {
        println!(
            "  Fertile window: {} to {}",
            window.fertile_start, window.fertile_end
        );
        println!("  Peak fertility: {} to {}", window.peak_start, window.peak_end);
        println!("  Ovulation: ~{}", window.ovulation_day);
    }

    Ok(())
}

fn display_outlook(outlook: &CycleOutlook, days_until: Option<i64>) {
    match outlook {
        CycleOutlook::Regular(regular) if regular.observed_cycles == 0 => {
            println!("No cycle history recorded yet.");
            println!(
                "  Assuming a {}-day cycle until cycles are logged.",
                regular.cycle_length
            );
            return;
        }
        CycleOutlook::Regular(regular) => {
            println!("Regular cycle: ~{} days", regular.cycle_length);
            match &regular.statistics {
                Some(stats) => println!(
                    "  Based on {} cycles (confidence {}%)",
                    regular.observed_cycles, stats.confidence
                ),
                None => println!(
                    "  Based on {} cycles (need {} for statistics)",
                    regular.observed_cycles,
                    MIN_OBSERVATIONS
                ),
            }
            if let Some(day) = regular.next_period {
                println!("  Next period expected: {}", day);
            }
        }
        CycleOutlook::Irregular(irregular) => {
            let stats = &irregular.statistics;
            println!(
                "Irregular cycle: {}-{} days (std dev {:.1} days)",
                stats.predicted_range.min, stats.predicted_range.max, stats.std_dev
            );
            println!(
                "  Based on {} cycles (confidence {}%)",
                irregular.observed_cycles, stats.confidence
            );
            println!(
                "  Next period window: {} to {}",
                stats.predicted_range.min_date, stats.predicted_range.max_date
            );
        }
    }

    if let Some(days) = days_until {
        println!("  {}", describe_countdown(days));
    }
}

fn describe_countdown(days: i64) -> String {
    match days {
        0 => "Expected today".into(),
        1 => "Expected tomorrow".into(),
        d if d > 1 => format!("In {} days", d),
        d => format!("{} days late", -d),
    }
}

#[derive(Serialize)]
struct StatsReport {
    summary: HistorySummary,
    statistics: Option<CycleStatisticsResult>,
}

fn cmd_stats(history_path: &Path, json: bool) -> Result<()> {
    let observations = load_observations(history_path)?;
    let report = StatsReport {
        summary: summarize(&observations),
        statistics: analyze(&observations),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let summary = &report.summary;
    println!("Cycle history: {} cycles", summary.total_cycles);
    if let (Some(avg), Some(shortest), Some(longest)) = (
        summary.average_cycle_length,
        summary.shortest_cycle,
        summary.longest_cycle,
    ) {
        println!(
            "  Average cycle length: {:.1} days (range {}-{})",
            avg, shortest, longest
        );
    }
    if let Some(avg) = summary.average_period_duration {
        println!("  Average period duration: {:.1} days", avg);
    }
    if let Some(start) = summary.last_period_start {
        println!("  Last cycle started: {}", start);
    }
    println!();

    match &report.statistics {
        None => {
            println!(
                "Not enough cycle history for statistics (need at least {} cycles, have {}).",
                MIN_OBSERVATIONS,
                summary.total_cycles
            );
        }
        Some(stats) => {
            println!("Statistics");
            println!("  Weighted mean cycle length: {} days", stats.mean);
            println!("  Variability (std dev): {:.1} days", stats.std_dev);
            println!(
                "  Pattern: {}",
                if stats.is_irregular { "irregular" } else { "regular" }
            );
            println!("  Confidence: {}%", stats.confidence);
            println!(
                "  Predicted next period: {}-{} days ({} to {})",
                stats.predicted_range.min,
                stats.predicted_range.max,
                stats.predicted_range.min_date,
                stats.predicted_range.max_date
            );
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct CheckReport<'a> {
    history: &'a Path,
    accepted: usize,
    rejected: &'a [RejectedRecord],
}

fn cmd_check(history_path: &Path, json: bool) -> Result<()> {
    let load = load_history(history_path)?;

    if json {
        let report = CheckReport {
            history: history_path,
            accepted: load.observations.len(),
            rejected: &load.rejected,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Checked {}", history_path.display());
        println!("  {} cycles accepted", load.observations.len());
        println!("  {} records rejected", load.rejected.len());
        for rejected in &load.rejected {
            println!("    line {}: {}", rejected.line, rejected.reason);
        }
    }

    if !load.rejected.is_empty() {
        return Err(Error::History(format!(
            "{} invalid records in {}",
            load.rejected.len(),
            history_path.display()
        )));
    }

    Ok(())
}
