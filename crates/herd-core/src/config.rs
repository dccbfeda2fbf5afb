//! Configuration loading and typed config structures for the herd simulation.
//!
//! The canonical configuration lives in `herd-config.yaml` at the project
//! root. Every key is required: a parameter file that omits one fails to
//! load rather than running with a silent default. After parsing,
//! [`SimulationConfig::validate`] checks the cross-field rules serde cannot
//! express.

use std::path::Path;

use serde::Deserialize;

use herd_animals::{AnimalParams, ParamError};
use herd_ledger::PriceList;
use herd_types::Breed;

/// Days in one reproduction statistics block.
pub const STAT_BLOCK_DAYS: u32 = 21;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content, including a missing required key.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The file parsed but a value is out of range or inconsistent.
    #[error("invalid configuration value {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

impl From<ParamError> for ConfigError {
    fn from(err: ParamError) -> Self {
        Self::Invalid {
            field: format!("animals.{}", err.field),
            reason: err.reason,
        }
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_owned(),
        reason: reason.into(),
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `herd-config.yaml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Run length, herd size, and reporting windows.
    pub run: RunConfig,

    /// Replacement market settings.
    pub market: MarketConfig,

    /// Biological and reproduction parameters.
    pub animals: AnimalParams,

    /// Prices and unit costs.
    pub economy: PriceList,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load and validate configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML or a key is
    /// missing, or [`ConfigError::Invalid`] if validation fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Same as [`from_file`](Self::from_file), minus I/O.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check ranges and cross-field consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.run.validate()?;
        self.market.validate()?;
        self.animals.validate()?;
        self.logging.validate()?;
        if self.market.open_day >= self.run.days {
            return Err(invalid("market.open_day", "must fall inside the run"));
        }
        Ok(())
    }
}

/// Run-level settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunConfig {
    /// Seed for the draw source.
    pub seed: u64,

    /// Number of simulated days.
    pub days: u32,

    /// Target number of adults; also the number of calves born on day 0.
    pub herd_size: u32,

    /// Breed of every animal in the run.
    pub breed: Breed,

    /// Trailing days over which economics are accrued.
    pub reporting_window: u32,

    /// Number of trailing 21-day blocks sampled for reproduction rates.
    pub repro_stat_blocks: u32,
}

impl RunConfig {
    /// Trailing days over which reproduction rates are sampled.
    pub const fn stat_window(&self) -> u32 {
        self.repro_stat_blocks.saturating_mul(STAT_BLOCK_DAYS)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.days == 0 {
            return Err(invalid("run.days", "must be at least 1"));
        }
        if self.herd_size == 0 {
            return Err(invalid("run.herd_size", "must be at least 1"));
        }
        if self.reporting_window == 0 || self.reporting_window > self.days {
            return Err(invalid(
                "run.reporting_window",
                format!("must be between 1 and run.days ({})", self.days),
            ));
        }
        if self.repro_stat_blocks == 0 || self.stat_window() > self.days {
            return Err(invalid(
                "run.repro_stat_blocks",
                format!(
                    "{} blocks of {STAT_BLOCK_DAYS} days do not fit in {} days",
                    self.repro_stat_blocks, self.days
                ),
            ));
        }
        Ok(())
    }
}

/// Replacement market settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MarketConfig {
    /// Number of calves simulated to stock the market.
    pub size: u32,

    /// Days the market animals are grown before the run starts.
    pub days: u32,

    /// Purchases only happen after this simulation day.
    pub open_day: u32,
}

impl MarketConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.days == 0 {
            return Err(invalid("market.days", "must be at least 1"));
        }
        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error), overridden by `RUST_LOG`.
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        match self.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => Err(invalid("logging.level", format!("unknown level {other:?}"))),
        }
    }
}
