//! End-of-run summary report.
//!
//! The report is a plain serializable snapshot assembled once after the
//! last day. The binary prints it as JSON; nothing in the run reads it back.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use herd_ledger::{HerdTotals, LedgerError};
use herd_types::CullReason;

use crate::config::SimulationConfig;
use crate::herd::{Herd, HerdStructure};
use crate::market::ReplacementMarket;
use crate::stats::{ParityClass, ReproRates};

/// Culling outcomes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CullingReport {
    /// Adult culls inside the reporting window per target adult.
    pub rate: f64,
    /// Adult culls inside the reporting window.
    pub adult_culls_in_window: u32,
    /// Adult culls over the whole run.
    pub adult_culls: u32,
    /// Breeding heifers culled for reproductive failure.
    pub heifer_culls: u32,
    /// Window culls by reason.
    pub reasons: BTreeMap<CullReason, u32>,
    /// Window culls by parity class.
    pub by_parity: BTreeMap<ParityClass, u32>,
}

/// Replacement flow over the whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementReport {
    /// Adults bought from the market.
    pub bought: u32,
    /// Adults left in the market.
    pub market_remaining: u32,
    /// Calves born alive and kept.
    pub calves_kept: u32,
    /// Calves sold at birth.
    pub calves_sold: u32,
    /// Stillborn calves.
    pub stillbirths: u32,
}

/// Everything reported at the end of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HerdReport {
    /// Wall-clock time the report was assembled.
    pub generated_at: DateTime<Utc>,
    /// Seed the run used.
    pub seed: u64,
    /// Simulated days.
    pub days: u32,
    /// Trailing days the economics cover.
    pub reporting_window: u32,
    /// Herd composition on the last day.
    pub structure: HerdStructure,
    /// Reporting-window economics.
    pub economics: HerdTotals,
    /// Averaged reproduction rates.
    pub reproduction: ReproRates,
    /// Culling outcomes.
    pub culling: CullingReport,
    /// Replacement flow.
    pub replacements: ReplacementReport,
}

impl HerdReport {
    /// Assemble the report from the final herd state.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the herd totals overflow.
    pub fn build(
        herd: &Herd,
        config: &SimulationConfig,
        market: &ReplacementMarket,
        generated_at: DateTime<Utc>,
    ) -> Result<Self, LedgerError> {
        let stats = herd.stats();
        let rate = if config.run.herd_size == 0 {
            0.0
        } else {
            f64::from(stats.adult_culls_in_window) / f64::from(config.run.herd_size)
        };
        Ok(Self {
            generated_at,
            seed: config.run.seed,
            days: config.run.days,
            reporting_window: config.run.reporting_window,
            structure: herd.structure(&config.animals),
            economics: herd.ledger().totals()?,
            reproduction: stats.repro_rates(),
            culling: CullingReport {
                rate,
                adult_culls_in_window: stats.adult_culls_in_window,
                adult_culls: stats.adult_culls,
                heifer_culls: stats.heifer_culls,
                reasons: stats.cull_reasons.clone(),
                by_parity: stats.culls_by_parity.clone(),
            },
            replacements: ReplacementReport {
                bought: market.withdrawn(),
                market_remaining: u32::try_from(market.remaining()).unwrap_or(u32::MAX),
                calves_kept: stats.calves_kept,
                calves_sold: stats.calves_sold,
                stillbirths: stats.stillbirths,
            },
        })
    }
}
