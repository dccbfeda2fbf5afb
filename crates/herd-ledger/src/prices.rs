//! Unit prices and costs used by the economics accrual.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Every price the simulation charges or credits.
///
/// Loaded from the `economy` section of the parameter file. Every field is
/// required.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PriceList {
    /// Milk price per kilogram.
    pub milk_price: Decimal,
    /// Feed cost per kilogram of dry matter while milking.
    pub feed_cost_milking: Decimal,
    /// Feed cost per kilogram of dry matter while dry.
    pub feed_cost_dry: Decimal,
    /// Fixed cost per adult per day.
    pub fixed_cost_per_day: Decimal,
    /// Cost of one GnRH dose.
    pub gnrh_cost: Decimal,
    /// Cost of one PGF dose.
    pub pgf_cost: Decimal,
    /// Cost of one CIDR insert.
    pub cidr_cost: Decimal,
    /// Labor cost per injection of any kind.
    pub injection_labor_cost: Decimal,
    /// Estrus detection cost per adult per day on an estrus-driven program.
    pub estrus_detection_cost_per_day: Decimal,
    /// Cost of one semen straw.
    pub semen_cost: Decimal,
    /// Labor cost of one insemination.
    pub insemination_cost: Decimal,
    /// Cost of one pregnancy diagnosis.
    pub pregnancy_check_cost: Decimal,
    /// Slaughter value per kilogram of body weight.
    pub slaughter_price_per_kg: Decimal,
    /// Value of one calf sold at birth.
    pub calf_price: Decimal,
    /// Income from one excess replacement heifer sold.
    pub heifer_sale_price: Decimal,
    /// Cost of one replacement bought from the market.
    pub heifer_purchase_price: Decimal,
}

impl Default for PriceList {
    fn default() -> Self {
        Self {
            milk_price: Decimal::new(40, 2),
            feed_cost_milking: Decimal::new(22, 2),
            feed_cost_dry: Decimal::new(18, 2),
            fixed_cost_per_day: Decimal::new(25, 1),
            gnrh_cost: Decimal::new(24, 1),
            pgf_cost: Decimal::new(265, 2),
            cidr_cost: Decimal::new(8, 0),
            injection_labor_cost: Decimal::new(25, 2),
            estrus_detection_cost_per_day: Decimal::new(15, 2),
            semen_cost: Decimal::new(10, 0),
            insemination_cost: Decimal::new(5, 0),
            pregnancy_check_cost: Decimal::new(3, 0),
            slaughter_price_per_kg: Decimal::new(65, 2),
            calf_price: Decimal::new(100, 0),
            heifer_sale_price: Decimal::new(1800, 0),
            heifer_purchase_price: Decimal::new(2000, 0),
        }
    }
}
