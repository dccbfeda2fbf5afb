//! Economic accrual and herd-level bookkeeping for the dairy herd simulation.
//!
//! Adults accrue feed cost, fixed cost, and milk income every day of the
//! trailing reporting window. When an adult leaves the herd (or the run
//! ends) its accruals are combined with its protocol tally and slaughter
//! value into one [`EconomicSummary`], which is appended to the
//! [`HerdLedger`] alongside herd-level sales and purchases.
//!
//! # Architecture
//!
//! - [`prices`] -- [`PriceList`], the unit prices and costs.
//! - [`tally`] -- [`ProtocolTally`], counts of billable reproduction work.
//! - [`accrual`] -- [`CostAccrual`], per-animal running totals.
//! - [`ledger`] -- [`EconomicSummary`] and the append-only [`HerdLedger`].
//!
//! All money is held as [`Decimal`]. Daily biological quantities arrive as
//! `f64` and are converted once, at the accrual boundary.

pub mod accrual;
pub mod ledger;
pub mod prices;
pub mod tally;

pub use accrual::{CostAccrual, DailyAccrual, RunningTotals};
pub use ledger::{EconomicSummary, HerdLedger, HerdTotals, Settlement};
pub use prices::PriceList;
pub use tally::ProtocolTally;

use rust_decimal::Decimal;

/// Errors raised while accruing or settling money.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// A biological quantity could not be represented as money.
    #[error("{what} is not a finite quantity: {value}")]
    NonFinite {
        /// Which quantity was being converted.
        what: &'static str,
        /// The offending value, formatted.
        value: String,
    },

    /// A decimal operation overflowed.
    #[error("decimal overflow while computing {what}")]
    Overflow {
        /// What was being computed.
        what: &'static str,
    },
}

/// Convert a daily `f64` quantity into a [`Decimal`].
pub(crate) fn to_decimal(value: f64, what: &'static str) -> Result<Decimal, LedgerError> {
    Decimal::try_from(value).map_err(|_err| LedgerError::NonFinite {
        what,
        value: format!("{value}"),
    })
}

/// `a + b` with overflow reported as [`LedgerError::Overflow`].
pub(crate) fn add(a: Decimal, b: Decimal, what: &'static str) -> Result<Decimal, LedgerError> {
    a.checked_add(b).ok_or(LedgerError::Overflow { what })
}

/// `a * b` with overflow reported as [`LedgerError::Overflow`].
pub(crate) fn mul(a: Decimal, b: Decimal, what: &'static str) -> Result<Decimal, LedgerError> {
    a.checked_mul(b).ok_or(LedgerError::Overflow { what })
}
