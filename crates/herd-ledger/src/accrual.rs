//! Per-animal running cost and income counters.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::prices::PriceList;
use crate::{LedgerError, add, mul, to_decimal};

/// One day's biological output for an adult, as seen by the accrual.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DailyAccrual {
    /// Dry-matter intake in kilograms.
    pub dry_matter_intake: f64,
    /// Milk yield in kilograms.
    pub milk_yield: f64,
    /// Whether the animal was milking (selects the feed rate).
    pub milking: bool,
    /// Whether today is the animal's culling day (no fixed cost).
    pub culled_today: bool,
}

/// Feed cost, fixed cost, and milk income totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningTotals {
    /// Cumulative feed cost.
    pub feed_cost: Decimal,
    /// Cumulative fixed cost.
    pub fixed_cost: Decimal,
    /// Cumulative milk income.
    pub milk_income: Decimal,
}

impl RunningTotals {
    fn add_day(&mut self, day: &DailyAccrual, prices: &PriceList) -> Result<(), LedgerError> {
        let rate = if day.milking {
            prices.feed_cost_milking
        } else {
            prices.feed_cost_dry
        };
        let dmi = to_decimal(day.dry_matter_intake, "dry matter intake")?;
        let milk = to_decimal(day.milk_yield, "milk yield")?;

        self.feed_cost = add(self.feed_cost, mul(dmi, rate, "feed cost")?, "feed cost")?;
        if !day.culled_today {
            self.fixed_cost = add(self.fixed_cost, prices.fixed_cost_per_day, "fixed cost")?;
        }
        self.milk_income = add(
            self.milk_income,
            mul(milk, prices.milk_price, "milk income")?,
            "milk income",
        )?;
        Ok(())
    }
}

/// Running totals for one adult.
///
/// The window totals only move while the reporting window is open and feed
/// the economic summary. The lifetime totals move every day and feed the
/// low-production culling rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostAccrual {
    window: RunningTotals,
    lifetime: RunningTotals,
    window_days: u32,
}

impl CostAccrual {
    /// Create an accrual with all totals at zero.
    pub const fn new() -> Self {
        Self {
            window: RunningTotals {
                feed_cost: Decimal::ZERO,
                fixed_cost: Decimal::ZERO,
                milk_income: Decimal::ZERO,
            },
            lifetime: RunningTotals {
                feed_cost: Decimal::ZERO,
                fixed_cost: Decimal::ZERO,
                milk_income: Decimal::ZERO,
            },
            window_days: 0,
        }
    }

    /// Accrue one day.
    pub fn accrue(
        &mut self,
        day: &DailyAccrual,
        prices: &PriceList,
        in_window: bool,
    ) -> Result<(), LedgerError> {
        self.lifetime.add_day(day, prices)?;
        if in_window {
            self.window.add_day(day, prices)?;
            self.window_days = self.window_days.saturating_add(1);
        }
        Ok(())
    }

    /// Totals accrued inside the reporting window.
    pub const fn window(&self) -> &RunningTotals {
        &self.window
    }

    /// Totals accrued over the animal's whole adult life.
    pub const fn lifetime(&self) -> &RunningTotals {
        &self.lifetime
    }

    /// Number of days accrued inside the reporting window.
    pub const fn window_days(&self) -> u32 {
        self.window_days
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn milking_day(dmi: f64, milk: f64) -> DailyAccrual {
        DailyAccrual {
            dry_matter_intake: dmi,
            milk_yield: milk,
            milking: true,
            culled_today: false,
        }
    }

    #[test]
    fn outside_window_only_lifetime_moves() {
        let prices = PriceList::default();
        let mut accrual = CostAccrual::new();
        accrual.accrue(&milking_day(20.0, 30.0), &prices, false).unwrap();
        assert_eq!(accrual.window(), &RunningTotals::default());
        assert_eq!(accrual.lifetime().milk_income, Decimal::new(12, 0));
        assert_eq!(accrual.window_days(), 0);
    }

    #[test]
    fn window_day_uses_milking_or_dry_feed_rate() {
        let prices = PriceList::default();
        let mut accrual = CostAccrual::new();
        accrual.accrue(&milking_day(10.0, 0.0), &prices, true).unwrap();
        let dry = DailyAccrual {
            dry_matter_intake: 10.0,
            milk_yield: 0.0,
            milking: false,
            culled_today: false,
        };
        accrual.accrue(&dry, &prices, true).unwrap();
        // 10 * 0.22 + 10 * 0.18
        assert_eq!(accrual.window().feed_cost, Decimal::new(4, 0));
        assert_eq!(accrual.window().fixed_cost, Decimal::new(5, 0));
    }

    #[test]
    fn culling_day_has_no_fixed_cost() {
        let prices = PriceList::default();
        let mut accrual = CostAccrual::new();
        let day = DailyAccrual {
            culled_today: true,
            ..milking_day(1.0, 1.0)
        };
        accrual.accrue(&day, &prices, true).unwrap();
        assert_eq!(accrual.window().fixed_cost, Decimal::ZERO);
    }

    #[test]
    fn non_finite_quantity_is_rejected() {
        let prices = PriceList::default();
        let mut accrual = CostAccrual::new();
        let result = accrual.accrue(&milking_day(f64::NAN, 1.0), &prices, true);
        assert!(matches!(result, Err(LedgerError::NonFinite { .. })));
    }
}
