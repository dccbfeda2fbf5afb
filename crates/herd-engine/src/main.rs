//! Command-line runner for the dairy herd simulation.
//!
//! This is the main entry point that wires together configuration, the
//! replacement market, and the day loop, then prints the end-of-run report
//! as JSON on stdout.
//!
//! # Startup Sequence
//!
//! 1. Resolve the config path (first argument, then `HERD_CONFIG`, then
//!    `herd-config.yaml`)
//! 2. Load and validate configuration
//! 3. Initialize structured logging (tracing) from `logging`
//! 4. Seed the draw source and stock the replacement market
//! 5. Run the simulation loop
//! 6. Log the result and print the report

mod error;
mod progress;

use std::path::PathBuf;

use herd_animals::SeededDraws;
use herd_core::config::{LoggingConfig, SimulationConfig};
use herd_core::market::ReplacementMarket;
use herd_core::runner;
use herd_types::IdIssuer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::progress::ProgressCallback;

/// Days between progress lines.
const PROGRESS_INTERVAL: u32 = 100;

/// Default configuration file in the working directory.
const DEFAULT_CONFIG: &str = "herd-config.yaml";

/// Application entry point for the herd engine.
///
/// # Errors
///
/// Returns an error if configuration, market generation, or the run fails.
fn main() -> Result<(), EngineError> {
    // 1-2. Load configuration.
    let config_path = config_path();
    let config = SimulationConfig::from_file(&config_path)?;

    // 3. Initialize structured logging.
    init_logging(&config.logging);
    info!(
        path = %config_path.display(),
        seed = config.run.seed,
        days = config.run.days,
        herd_size = config.run.herd_size,
        breed = %config.run.breed,
        "Configuration loaded"
    );

    // 4. Stock the replacement market from the same draw source and issuer
    //    the herd will use.
    let mut draws = SeededDraws::new(config.run.seed);
    let mut issuer = IdIssuer::new();
    let mut market = ReplacementMarket::generate(
        &config.market,
        config.run.breed,
        &config.animals,
        &config.economy,
        &mut issuer,
        &mut draws,
    )?;

    // 5. Run.
    let mut callback = ProgressCallback::new(PROGRESS_INTERVAL);
    let result = runner::run_simulation(&config, &mut market, issuer, &mut draws, &mut callback)?;

    // 6. Report.
    runner::log_simulation_end(&result);
    println!("{}", serde_json::to_string_pretty(&result.report)?);
    Ok(())
}

/// The config path from the first argument, `HERD_CONFIG`, or the default.
fn config_path() -> PathBuf {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var("HERD_CONFIG").ok())
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG), PathBuf::from)
}

/// Install the global subscriber. `RUST_LOG` overrides the configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}
