//! Per-animal economic summaries and the herd-level ledger.
//!
//! # Design
//!
//! - **Append-only**: summaries and sale/purchase records are never
//!   modified once written.
//! - **One summary per adult**: written when the adult is culled, or at the
//!   end of the run for survivors.
//! - **Precision**: all money uses [`Decimal`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use herd_types::AnimalId;

use crate::accrual::CostAccrual;
use crate::prices::PriceList;
use crate::tally::ProtocolTally;
use crate::{LedgerError, add, mul, to_decimal};

// ---------------------------------------------------------------------------
// Economic summary
// ---------------------------------------------------------------------------

/// The settled economics of one adult.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomicSummary {
    /// The adult this summary belongs to.
    pub animal: AnimalId,
    /// Whether the adult was culled (as opposed to surviving the run).
    pub culled: bool,
    /// Hormone, labor, and estrus-detection cost.
    pub breeding_cost: Decimal,
    /// Semen straw cost.
    pub semen_cost: Decimal,
    /// Insemination labor cost.
    pub insemination_cost: Decimal,
    /// Pregnancy diagnosis cost.
    pub diagnosis_cost: Decimal,
    /// Feed cost inside the reporting window.
    pub feed_cost: Decimal,
    /// Fixed cost inside the reporting window.
    pub fixed_cost: Decimal,
    /// Milk income inside the reporting window.
    pub milk_income: Decimal,
    /// Slaughter value; zero unless culled inside the reporting window.
    pub slaughter_value: Decimal,
    /// Days this adult spent inside the reporting window.
    pub window_days: u32,
}

/// Inputs to [`EconomicSummary::settle`].
#[derive(Debug, Clone, Copy)]
pub struct Settlement<'a> {
    /// The adult being settled.
    pub animal: AnimalId,
    /// Whether it is leaving because it was culled.
    pub culled: bool,
    /// Whether the removal happened inside the reporting window.
    pub in_window: bool,
    /// Final body weight in kilograms.
    pub body_weight: f64,
    /// Its reproduction tally.
    pub tally: &'a ProtocolTally,
    /// Its cost accrual.
    pub accrual: &'a CostAccrual,
}

impl EconomicSummary {
    /// Combine an adult's tally, accrual, and final weight into a summary.
    pub fn settle(settlement: &Settlement<'_>, prices: &PriceList) -> Result<Self, LedgerError> {
        let window = settlement.accrual.window();
        let slaughter_value = if settlement.culled && settlement.in_window {
            mul(
                to_decimal(settlement.body_weight, "body weight")?,
                prices.slaughter_price_per_kg,
                "slaughter value",
            )?
        } else {
            Decimal::ZERO
        };

        Ok(Self {
            animal: settlement.animal,
            culled: settlement.culled,
            breeding_cost: settlement.tally.breeding_cost(prices)?,
            semen_cost: settlement.tally.semen_cost(prices)?,
            insemination_cost: settlement.tally.insemination_cost(prices)?,
            diagnosis_cost: settlement.tally.diagnosis_cost(prices)?,
            feed_cost: window.feed_cost,
            fixed_cost: window.fixed_cost,
            milk_income: window.milk_income,
            slaughter_value,
            window_days: settlement.accrual.window_days(),
        })
    }

    /// Breeding, semen, insemination, and diagnosis cost together.
    pub fn reproduction_cost(&self) -> Result<Decimal, LedgerError> {
        let what = "reproduction cost";
        let mut total = add(self.breeding_cost, self.semen_cost, what)?;
        total = add(total, self.insemination_cost, what)?;
        add(total, self.diagnosis_cost, what)
    }
}

// ---------------------------------------------------------------------------
// Herd ledger
// ---------------------------------------------------------------------------

/// Aggregated economics over the reporting window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HerdTotals {
    /// Hormone, labor, and estrus-detection cost.
    pub breeding_cost: Decimal,
    /// Semen cost.
    pub semen_cost: Decimal,
    /// Insemination labor cost.
    pub insemination_cost: Decimal,
    /// Pregnancy diagnosis cost.
    pub diagnosis_cost: Decimal,
    /// Sum of the four reproduction costs.
    pub reproduction_cost: Decimal,
    /// Feed cost.
    pub feed_cost: Decimal,
    /// Fixed cost.
    pub fixed_cost: Decimal,
    /// Milk income.
    pub milk_income: Decimal,
    /// Slaughter value of culled adults.
    pub slaughter_value: Decimal,
    /// Income from calves sold at birth.
    pub calf_income: Decimal,
    /// Income from excess replacement heifers sold.
    pub heifer_income: Decimal,
    /// Cost of replacements bought from the market.
    pub replacement_cost: Decimal,
    /// Calves sold.
    pub calves_sold: u32,
    /// Heifers sold.
    pub heifers_sold: u32,
    /// Replacements bought.
    pub replacements_bought: u32,
    /// Adult-days inside the window.
    pub adult_days: u64,
    /// Feed cost per adult per day.
    pub feed_cost_per_cow_day: Decimal,
    /// Fixed cost per adult per day.
    pub fixed_cost_per_cow_day: Decimal,
    /// Reproduction cost per adult per day.
    pub reproduction_cost_per_cow_day: Decimal,
    /// Milk income per adult per day.
    pub milk_income_per_cow_day: Decimal,
    /// Income over feed cost per adult per day.
    pub income_over_feed_cost: Decimal,
    /// Milk, slaughter, heifer, and calf income minus feed, replacement,
    /// and fixed cost.
    pub net_return: Decimal,
}

/// The append-only herd ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HerdLedger {
    summaries: Vec<EconomicSummary>,
    calves_sold: u32,
    heifers_sold: u32,
    replacements_bought: u32,
    calf_income: Decimal,
    heifer_income: Decimal,
    replacement_cost: Decimal,
}

impl HerdLedger {
    /// Create an empty ledger.
    pub const fn new() -> Self {
        Self {
            summaries: Vec::new(),
            calves_sold: 0,
            heifers_sold: 0,
            replacements_bought: 0,
            calf_income: Decimal::ZERO,
            heifer_income: Decimal::ZERO,
            replacement_cost: Decimal::ZERO,
        }
    }

    /// Append one adult's summary.
    pub fn record_summary(&mut self, summary: EconomicSummary) {
        debug!(
            animal = %summary.animal,
            culled = summary.culled,
            milk_income = %summary.milk_income,
            "Economic summary recorded"
        );
        self.summaries.push(summary);
    }

    /// Record a calf sold at birth.
    pub fn record_calf_sale(&mut self, prices: &PriceList) -> Result<(), LedgerError> {
        self.calves_sold = self.calves_sold.saturating_add(1);
        self.calf_income = add(self.calf_income, prices.calf_price, "calf income")?;
        Ok(())
    }

    /// Record an excess replacement heifer sold.
    pub fn record_heifer_sale(&mut self, prices: &PriceList) -> Result<(), LedgerError> {
        self.heifers_sold = self.heifers_sold.saturating_add(1);
        self.heifer_income = add(self.heifer_income, prices.heifer_sale_price, "heifer income")?;
        Ok(())
    }

    /// Record a replacement bought from the market.
    pub fn record_purchase(&mut self, prices: &PriceList) -> Result<(), LedgerError> {
        self.replacements_bought = self.replacements_bought.saturating_add(1);
        self.replacement_cost = add(
            self.replacement_cost,
            prices.heifer_purchase_price,
            "replacement cost",
        )?;
        Ok(())
    }

    /// All summaries recorded so far.
    pub fn summaries(&self) -> &[EconomicSummary] {
        &self.summaries
    }

    /// Aggregate every summary and herd-level record.
    pub fn totals(&self) -> Result<HerdTotals, LedgerError> {
        let mut totals = HerdTotals {
            calf_income: self.calf_income,
            heifer_income: self.heifer_income,
            replacement_cost: self.replacement_cost,
            calves_sold: self.calves_sold,
            heifers_sold: self.heifers_sold,
            replacements_bought: self.replacements_bought,
            ..HerdTotals::default()
        };

        for s in &self.summaries {
            totals.breeding_cost = add(totals.breeding_cost, s.breeding_cost, "breeding cost")?;
            totals.semen_cost = add(totals.semen_cost, s.semen_cost, "semen cost")?;
            totals.insemination_cost =
                add(totals.insemination_cost, s.insemination_cost, "insemination cost")?;
            totals.diagnosis_cost = add(totals.diagnosis_cost, s.diagnosis_cost, "diagnosis cost")?;
            totals.feed_cost = add(totals.feed_cost, s.feed_cost, "feed cost")?;
            totals.fixed_cost = add(totals.fixed_cost, s.fixed_cost, "fixed cost")?;
            totals.milk_income = add(totals.milk_income, s.milk_income, "milk income")?;
            totals.slaughter_value =
                add(totals.slaughter_value, s.slaughter_value, "slaughter value")?;
            totals.adult_days = totals.adult_days.saturating_add(u64::from(s.window_days));
        }

        let what = "reproduction cost";
        totals.reproduction_cost = add(totals.breeding_cost, totals.semen_cost, what)?;
        totals.reproduction_cost = add(totals.reproduction_cost, totals.insemination_cost, what)?;
        totals.reproduction_cost = add(totals.reproduction_cost, totals.diagnosis_cost, what)?;

        let days = Decimal::from(totals.adult_days);
        totals.feed_cost_per_cow_day = per_day(totals.feed_cost, days);
        totals.fixed_cost_per_cow_day = per_day(totals.fixed_cost, days);
        totals.reproduction_cost_per_cow_day = per_day(totals.reproduction_cost, days);
        totals.milk_income_per_cow_day = per_day(totals.milk_income, days);
        totals.income_over_feed_cost = totals
            .milk_income_per_cow_day
            .checked_sub(totals.feed_cost_per_cow_day)
            .ok_or(LedgerError::Overflow { what: "IOFC" })?;

        let what = "net return";
        let income = add(
            add(totals.milk_income, totals.slaughter_value, what)?,
            add(totals.heifer_income, totals.calf_income, what)?,
            what,
        )?;
        let cost = add(
            add(totals.feed_cost, totals.replacement_cost, what)?,
            totals.fixed_cost,
            what,
        )?;
        totals.net_return = income
            .checked_sub(cost)
            .ok_or(LedgerError::Overflow { what })?;

        Ok(totals)
    }
}

fn per_day(total: Decimal, days: Decimal) -> Decimal {
    total
        .checked_div(days)
        .map_or(Decimal::ZERO, |v| v.round_dp(4))
}
