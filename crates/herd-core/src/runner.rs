//! Simulation loop runner.
//!
//! This module provides [`run_simulation`], the top-level function that
//! drives the day loop:
//!
//! - **Bounded run**: exactly `run.days` ticks, day 0 through the last day
//! - **Windows**: the economics window opens on a fixed day before the end
//! - **Settlement**: adults alive after the last day are settled once
//! - **Observation**: a [`DayCallback`] sees every completed day
//!
//! The runner wraps the single-day [`Herd::tick`] and adds the clock and
//! reporting around it.

use chrono::Utc;
use tracing::{debug, info, warn};

use herd_animals::DrawSource;
use herd_ledger::LedgerError;
use herd_types::IdIssuer;

use crate::clock::{ClockError, SimClock};
use crate::config::SimulationConfig;
use crate::herd::{DaySummary, Herd, HerdError};
use crate::market::ReplacementMarket;
use crate::report::HerdReport;

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A day's tick failed.
    #[error("herd error: {source}")]
    Herd {
        /// The underlying herd error.
        #[from]
        source: HerdError,
    },

    /// The run configuration did not produce a usable clock.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// The final report could not be assembled.
    #[error("report error: {source}")]
    Report {
        /// The underlying ledger error.
        #[from]
        source: LedgerError,
    },
}

/// Result of the simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The end-of-run report.
    pub report: HerdReport,
    /// The last day summary, if any day completed.
    pub final_summary: Option<DaySummary>,
    /// Total number of days executed.
    pub days_run: u32,
}

/// Callback invoked after each day completes.
///
/// The callback receives the day summary and the herd as it stands after
/// newborns were enqueued.
pub trait DayCallback: Send {
    /// Called after a day completes successfully.
    fn on_day(&mut self, summary: &DaySummary, herd: &Herd);
}

/// A no-op day callback.
pub struct NoOpCallback;

impl DayCallback for NoOpCallback {
    fn on_day(&mut self, _summary: &DaySummary, _herd: &Herd) {}
}

/// Run the simulation for `config.run.days` days.
///
/// The herd starts as `herd_size` calves born on day 0 and draws
/// identifiers from `issuer`, which should be the issuer the market was
/// generated with.
///
/// # Errors
///
/// Returns [`RunnerError`] on the first failing day; a partially run herd
/// is discarded.
pub fn run_simulation(
    config: &SimulationConfig,
    market: &mut ReplacementMarket,
    issuer: IdIssuer,
    draws: &mut dyn DrawSource,
    callback: &mut dyn DayCallback,
) -> Result<SimulationResult, RunnerError> {
    let mut clock = SimClock::new(&config.run)?;
    let mut herd = Herd::new(&config.run, issuer);
    let mut last_summary: Option<DaySummary> = None;
    let mut days_run: u32 = 0;

    info!(
        seed = config.run.seed,
        days = config.run.days,
        herd_size = config.run.herd_size,
        breed = %config.run.breed,
        market = market.remaining(),
        "Simulation starting"
    );

    herd.populate(&clock, config, draws)?;

    loop {
        if clock.opens_reporting_window() {
            info!(
                day = clock.day(),
                window = config.run.reporting_window,
                adults = herd.adults().len(),
                "Reporting window opened"
            );
        }

        // --- Execute day ---
        let summary = herd.tick(&clock, config, market, draws)?;
        days_run = days_run.saturating_add(1);

        // --- Notify callback ---
        callback.on_day(&summary, &herd);
        last_summary = Some(summary);

        if clock.is_last_day() {
            break;
        }
        clock.advance()?;
    }

    herd.settle_survivors(clock.day(), &config.economy)?;
    let report = HerdReport::build(&herd, config, market, Utc::now())?;
    debug!(survivors = herd.adults().len(), "Survivors settled");

    Ok(SimulationResult {
        report,
        final_summary: last_summary,
        days_run,
    })
}

/// Log the simulation end sequence.
///
/// This should be called after [`run_simulation`] returns.
pub fn log_simulation_end(result: &SimulationResult) {
    let report = &result.report;
    info!(
        days_run = result.days_run,
        adults = report.structure.adults,
        pregnant = report.structure.adults_pregnant,
        milking = report.structure.adults_milking,
        bought = report.replacements.bought,
        "Simulation ended"
    );

    if let Some(ref summary) = result.final_summary {
        info!(
            day = summary.day,
            calves = summary.calves,
            heifers = summary
                .growing
                .saturating_add(summary.breeding)
                .saturating_add(summary.pre_calving),
            net_return = %report.economics.net_return,
            pregnancy_rate = report.reproduction.pregnancy_rate,
            "Final day summary"
        );
    } else {
        warn!("Simulation ended with no days executed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use herd_animals::SeededDraws;

    const SAMPLE: &str = include_str!("../../../herd-config.yaml");

    struct Recorder {
        days: Vec<u32>,
        windows: usize,
    }

    impl DayCallback for Recorder {
        fn on_day(&mut self, summary: &DaySummary, _herd: &Herd) {
            self.days.push(summary.day);
            if summary.in_window {
                self.windows += 1;
            }
        }
    }

    fn short_config() -> SimulationConfig {
        let mut config = SimulationConfig::parse(SAMPLE).unwrap();
        config.run.days = 60;
        config.run.herd_size = 10;
        config.run.reporting_window = 20;
        config.run.repro_stat_blocks = 1;
        config.market.open_day = 0;
        config
    }

    #[test]
    fn open_market_without_supply_fails_on_the_first_purchase_day() {
        let config = short_config();
        let mut market = ReplacementMarket::default();
        let mut draws = SeededDraws::new(3);
        let mut recorder = Recorder {
            days: Vec::new(),
            windows: 0,
        };
        // No adults are needed before the market opens on day 0, so an empty
        // market fails on day 1.
        let err = run_simulation(
            &config,
            &mut market,
            IdIssuer::new(),
            &mut draws,
            &mut recorder,
        )
        .unwrap_err();
        assert!(matches!(err, RunnerError::Herd { .. }));
        assert_eq!(recorder.days, vec![0]);
    }

    #[test]
    fn closed_market_lets_the_herd_grow_alone() {
        let mut config = short_config();
        config.market.open_day = config.run.days - 1;
        let mut market = ReplacementMarket::default();
        let mut draws = SeededDraws::new(3);
        let mut recorder = Recorder {
            days: Vec::new(),
            windows: 0,
        };
        let result = run_simulation(
            &config,
            &mut market,
            IdIssuer::new(),
            &mut draws,
            &mut recorder,
        )
        .unwrap();

        assert_eq!(result.days_run, 60);
        assert_eq!(recorder.days, (0..60).collect::<Vec<_>>());
        assert_eq!(recorder.windows, 20);
        assert_eq!(result.final_summary.unwrap().day, 59);
        assert_eq!(result.report.structure.adults, 0);
        assert_eq!(
            result.report.replacements.calves_kept
                + result.report.replacements.calves_sold
                + result.report.replacements.stillbirths,
            10
        );
        log_simulation_end(&result);
    }
}
