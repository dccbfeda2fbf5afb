//! Counts of billable reproduction work for one animal.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use herd_types::Hormone;

use crate::prices::PriceList;
use crate::{LedgerError, add, mul};

/// Injections, semen, inseminations, diagnoses, and estrus-detection days.
///
/// Counters only move while the reporting window is open; callers decide
/// that, the tally just counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolTally {
    /// GnRH doses given.
    pub gnrh: u32,
    /// PGF doses given.
    pub pgf: u32,
    /// CIDR inserts placed.
    pub cidr: u32,
    /// Semen straws used.
    pub semen_doses: u32,
    /// Inseminations performed.
    pub inseminations: u32,
    /// Pregnancy diagnoses performed.
    pub diagnoses: u32,
    /// Days spent on estrus detection.
    pub estrus_detection_days: u32,
}

impl ProtocolTally {
    /// Count one injection of `hormone`.
    pub const fn record_injection(&mut self, hormone: Hormone) {
        let slot = match hormone {
            Hormone::Gnrh => &mut self.gnrh,
            Hormone::Pgf => &mut self.pgf,
            Hormone::Cidr => &mut self.cidr,
        };
        *slot = slot.saturating_add(1);
    }

    /// Count one insemination and the straw it used.
    pub const fn record_insemination(&mut self) {
        self.inseminations = self.inseminations.saturating_add(1);
        self.semen_doses = self.semen_doses.saturating_add(1);
    }

    /// Count one pregnancy diagnosis.
    pub const fn record_diagnosis(&mut self) {
        self.diagnoses = self.diagnoses.saturating_add(1);
    }

    /// Count one day of estrus detection.
    pub const fn record_estrus_detection_day(&mut self) {
        self.estrus_detection_days = self.estrus_detection_days.saturating_add(1);
    }

    /// Total injections of every hormone.
    pub const fn injections(&self) -> u32 {
        self.gnrh.saturating_add(self.pgf).saturating_add(self.cidr)
    }

    /// Hormone, labor, and estrus-detection cost.
    pub fn breeding_cost(&self, prices: &PriceList) -> Result<Decimal, LedgerError> {
        let what = "breeding cost";
        let mut total = mul(Decimal::from(self.gnrh), prices.gnrh_cost, what)?;
        total = add(total, mul(Decimal::from(self.pgf), prices.pgf_cost, what)?, what)?;
        total = add(total, mul(Decimal::from(self.cidr), prices.cidr_cost, what)?, what)?;
        total = add(
            total,
            mul(Decimal::from(self.injections()), prices.injection_labor_cost, what)?,
            what,
        )?;
        add(
            total,
            mul(
                Decimal::from(self.estrus_detection_days),
                prices.estrus_detection_cost_per_day,
                what,
            )?,
            what,
        )
    }

    /// Semen straw cost.
    pub fn semen_cost(&self, prices: &PriceList) -> Result<Decimal, LedgerError> {
        mul(Decimal::from(self.semen_doses), prices.semen_cost, "semen cost")
    }

    /// Insemination labor cost.
    pub fn insemination_cost(&self, prices: &PriceList) -> Result<Decimal, LedgerError> {
        mul(
            Decimal::from(self.inseminations),
            prices.insemination_cost,
            "insemination cost",
        )
    }

    /// Pregnancy diagnosis cost.
    pub fn diagnosis_cost(&self, prices: &PriceList) -> Result<Decimal, LedgerError> {
        mul(
            Decimal::from(self.diagnoses),
            prices.pregnancy_check_cost,
            "diagnosis cost",
        )
    }
}
