//! Rolling herd statistics sampled over the trailing windows.
//!
//! Reproduction rates are measured in 21-day blocks. Within a block every
//! adult past its voluntary waiting period and not pregnant contributes one
//! eligible day, every insemination counts as a service, and every new
//! pregnancy counts as a conception. A block's service rate is services per
//! eligible day, scaled back to a 21-day cycle when averaged.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use herd_animals::Adult;
use herd_types::{CullReason, EventKind};

use crate::config::STAT_BLOCK_DAYS;

/// Parity class used in herd structure and culling tallies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ParityClass {
    /// Entered the herd but not yet calved.
    #[serde(rename = "0")]
    Zero,
    /// First lactation.
    #[serde(rename = "1")]
    First,
    /// Second lactation.
    #[serde(rename = "2")]
    Second,
    /// Third lactation.
    #[serde(rename = "3")]
    Third,
    /// Fourth and later lactations.
    #[serde(rename = "4+")]
    FourthPlus,
}

impl ParityClass {
    /// Bucket a parity count.
    pub const fn of(parity: u32) -> Self {
        match parity {
            0 => Self::Zero,
            1 => Self::First,
            2 => Self::Second,
            3 => Self::Third,
            _ => Self::FourthPlus,
        }
    }
}

/// Counts for one 21-day block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReproBlock {
    /// Inseminations performed.
    pub services: u32,
    /// Adult-days past the waiting period and not pregnant.
    pub eligible_days: u32,
    /// Pregnancies started.
    pub conceptions: u32,
}

impl ReproBlock {
    /// Services per eligible day, if any adult was eligible.
    pub fn service_rate(&self) -> Option<f64> {
        (self.eligible_days > 0)
            .then(|| f64::from(self.services) / f64::from(self.eligible_days))
    }

    /// Conceptions per service, if any service happened.
    pub fn conception_rate(&self) -> Option<f64> {
        (self.services > 0).then(|| f64::from(self.conceptions) / f64::from(self.services))
    }
}

/// Averaged reproduction rates over the statistics window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReproRates {
    /// Service rate per 21-day cycle.
    pub service_rate: f64,
    /// Conception rate per service.
    pub conception_rate: f64,
    /// Service rate times conception rate.
    pub pregnancy_rate: f64,
    /// Completed blocks.
    pub blocks: u32,
}

/// Herd-level tallies accumulated while the run progresses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HerdStats {
    blocks: Vec<ReproBlock>,
    current: ReproBlock,
    block_days: u32,
    /// Adult cull reasons inside the reporting window.
    pub cull_reasons: BTreeMap<CullReason, u32>,
    /// Adult culls by parity class inside the reporting window.
    pub culls_by_parity: BTreeMap<ParityClass, u32>,
    /// Adult culls inside the reporting window.
    pub adult_culls_in_window: u32,
    /// Adult culls over the whole run.
    pub adult_culls: u32,
    /// Breeding heifers culled for reproductive failure over the whole run.
    pub heifer_culls: u32,
    /// Calves born alive and kept.
    pub calves_kept: u32,
    /// Calves sold at birth.
    pub calves_sold: u32,
    /// Stillborn calves.
    pub stillbirths: u32,
}

impl HerdStats {
    /// Create empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample one adult after its daily update inside the statistics window.
    pub fn observe_adult(&mut self, adult: &Adult, voluntary_waiting_period: u32) {
        let today = adult.record.days_born;
        if adult
            .record
            .events
            .on_day(today)
            .any(|e| matches!(e.kind, EventKind::Inseminated))
        {
            self.current.services = self.current.services.saturating_add(1);
        }
        if adult.days_in_milk > voluntary_waiting_period && !adult.repro.is_pregnant() {
            self.current.eligible_days = self.current.eligible_days.saturating_add(1);
        }
        if adult.repro.pregnancy.is_some_and(|p| p.days == 1) {
            self.current.conceptions = self.current.conceptions.saturating_add(1);
        }
    }

    /// Close a statistics day; every 21st day closes the block.
    pub fn close_day(&mut self) {
        self.block_days = self.block_days.saturating_add(1);
        if self.block_days >= STAT_BLOCK_DAYS {
            let block = std::mem::take(&mut self.current);
            if block.eligible_days == 0 {
                warn!(
                    block = self.blocks.len(),
                    "Reproduction block had no eligible adults"
                );
            }
            self.blocks.push(block);
            self.block_days = 0;
        }
    }

    /// Record an adult cull.
    pub fn record_adult_cull(&mut self, reason: CullReason, parity: u32, in_window: bool) {
        self.adult_culls = self.adult_culls.saturating_add(1);
        if in_window {
            self.adult_culls_in_window = self.adult_culls_in_window.saturating_add(1);
            let count = self.cull_reasons.entry(reason).or_default();
            *count = count.saturating_add(1);
            let count = self.culls_by_parity.entry(ParityClass::of(parity)).or_default();
            *count = count.saturating_add(1);
        }
    }

    /// Record a breeding heifer culled for reproductive failure.
    pub const fn record_heifer_cull(&mut self) {
        self.heifer_culls = self.heifer_culls.saturating_add(1);
    }

    /// Completed 21-day blocks.
    pub fn blocks(&self) -> &[ReproBlock] {
        &self.blocks
    }

    /// Average the completed blocks.
    ///
    /// Blocks with no eligible adults are left out of the service rate and
    /// blocks with no services are left out of the conception rate.
    pub fn repro_rates(&self) -> ReproRates {
        let service = mean(self.blocks.iter().filter_map(ReproBlock::service_rate))
            * f64::from(STAT_BLOCK_DAYS);
        let conception = mean(self.blocks.iter().filter_map(ReproBlock::conception_rate));
        ReproRates {
            service_rate: service,
            conception_rate: conception,
            pregnancy_rate: service * conception,
            blocks: u32::try_from(self.blocks.len()).unwrap_or(u32::MAX),
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0_u32), |(sum, count), v| {
        (sum + v, count.saturating_add(1))
    });
    if count == 0 { 0.0 } else { sum / f64::from(count) }
}
