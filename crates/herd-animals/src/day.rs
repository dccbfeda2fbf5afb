//! Inputs and outputs of one simulated day for one animal.

use herd_ledger::PriceList;
use herd_types::CullReason;

use crate::config::AnimalParams;
use crate::draws::DrawSource;

/// Everything an animal needs to advance one day.
pub struct DayContext<'a> {
    /// Biological parameters.
    pub params: &'a AnimalParams,
    /// Unit prices for accrual.
    pub prices: &'a PriceList,
    /// Random draws.
    pub draws: &'a mut dyn DrawSource,
    /// Whether the trailing reporting window is open.
    pub in_window: bool,
}

impl core::fmt::Debug for DayContext<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DayContext")
            .field("in_window", &self.in_window)
            .finish_non_exhaustive()
    }
}

/// Stage change requested by an animal at the end of its day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Move to the next life stage.
    Promote,
    /// Remove from the herd.
    Cull(CullReason),
}

/// Flags returned to the orchestrator after one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayOutcome {
    /// Requested stage change, if any.
    pub transition: Option<Transition>,
    /// The animal calved today.
    pub calved: bool,
}

impl DayOutcome {
    /// No change.
    pub const fn stay() -> Self {
        Self {
            transition: None,
            calved: false,
        }
    }

    /// Promote to the next stage.
    pub const fn promote() -> Self {
        Self {
            transition: Some(Transition::Promote),
            calved: false,
        }
    }

    /// Cull for `reason`.
    pub const fn cull(reason: CullReason) -> Self {
        Self {
            transition: Some(Transition::Cull(reason)),
            calved: false,
        }
    }

    /// The cull reason, if culled.
    pub const fn culled(&self) -> Option<CullReason> {
        match self.transition {
            Some(Transition::Cull(reason)) => Some(reason),
            _ => None,
        }
    }

    /// Whether a promotion was requested.
    pub const fn promoted(&self) -> bool {
        matches!(self.transition, Some(Transition::Promote))
    }
}
