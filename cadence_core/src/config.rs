//! Configuration file support for cadence.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/cadence/config.toml`.
//! The statistics engine's calibration constants are deliberately not part
//! of it.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

/// Luteal phase lengths accepted in `[prediction]`
const LUTEAL_PHASE_RANGE: RangeInclusive<u32> = 7..=20;

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub prediction: PredictionConfig,
}

/// Where the cycle history lives
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// History file name, relative to `data_dir`
    #[serde(default = "default_history_file")]
    pub history_file: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            history_file: default_history_file(),
        }
    }
}

/// Options for the derived predictions shown alongside the statistics
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PredictionConfig {
    /// Days from ovulation to the next period
    #[serde(default = "default_luteal_phase_days")]
    pub luteal_phase_days: u32,

    /// Show the fertile window without passing `--fertility`
    #[serde(default)]
    pub show_fertility: bool,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            luteal_phase_days: default_luteal_phase_days(),
            show_fertility: false,
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".local/share")
    });
    base.join("cadence")
}

fn default_history_file() -> String {
    "cycles.csv".into()
}

fn default_luteal_phase_days() -> u32 {
    14
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config")
        });
        base.join("cadence").join("config.toml")
    }

    /// Full path of the cycle history file
    pub fn history_path(&self) -> PathBuf {
        self.data.data_dir.join(&self.data.history_file)
    }

    /// Check values that serde defaults cannot guard
    pub fn validate(&self) -> Result<()> {
        if !LUTEAL_PHASE_RANGE.contains(&self.prediction.luteal_phase_days) {
            return Err(Error::Config(format!(
                "luteal_phase_days must be between {} and {}, got {}",
                LUTEAL_PHASE_RANGE.start(),
                LUTEAL_PHASE_RANGE.end(),
                self.prediction.luteal_phase_days
            )));
        }

        if self.data.history_file.trim().is_empty() {
            return Err(Error::Config("history_file must not be empty".into()));
        }

        Ok(())
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
