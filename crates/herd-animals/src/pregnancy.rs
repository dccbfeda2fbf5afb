//! Insemination outcome, pregnancy tracking, and staged pregnancy checks.
//!
//! [`ReproState`] is shared by every breeding-capable stage and carried by
//! value through promotion. Protocols decide *when* an insemination
//! happens; this module decides what follows from it.

use serde::{Deserialize, Serialize};

use herd_ledger::ProtocolTally;
use herd_types::{AnimalRecord, EventKind};

use crate::config::PregnancyParams;
use crate::draws::{DrawSource, whole_days};
use crate::error::AnimalError;

/// An established pregnancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pregnancy {
    /// Days pregnant, starting at 1 on the insemination day.
    pub days: u32,
    /// Gestation length drawn at conception.
    pub gestation: u32,
}

impl Pregnancy {
    /// Whether the pregnancy has reached `gestation - window` days.
    pub const fn within(&self, window: u32) -> bool {
        self.days == self.gestation.saturating_sub(window)
    }

    /// Whether today's increment brings the pregnancy to `gestation - window`.
    pub const fn reaches_today(&self, window: u32) -> bool {
        self.days.saturating_add(1) == self.gestation.saturating_sub(window)
    }
}

/// What the daily pregnancy update observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PregnancyEvent {
    /// Nothing happened today.
    Quiet,
    /// Inseminated today and conceived.
    Conceived,
    /// Inseminated today and did not conceive.
    NotConceived,
    /// Diagnosed open at the first check without ever conceiving.
    Open,
    /// Pregnancy lost at the given check (1-based).
    Lost(u8),
}

impl PregnancyEvent {
    /// Whether the animal is now open and needs its program restarted.
    pub const fn reopens(self) -> bool {
        matches!(self, Self::Open | Self::Lost(_))
    }
}

/// Reproductive state of a breeding-capable animal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReproState {
    /// Day of the pending or most recent insemination.
    pub ai_day: Option<u32>,
    /// Conception rate for the pending insemination.
    pub conception_rate: f64,
    /// The current pregnancy, if any.
    pub pregnancy: Option<Pregnancy>,
    /// Day of the most recent open diagnosis or pregnancy loss.
    pub abortion_day: Option<u32>,
    /// The next conception rate assignment is reduced by the penalty.
    pub penalty_pending: bool,
    /// Estrus occurrences observed.
    pub estrus_count: u32,
    /// Injections, inseminations, and diagnoses counted for costing.
    pub tally: ProtocolTally,
}

impl ReproState {
    /// Whether a pregnancy is established.
    pub const fn is_pregnant(&self) -> bool {
        self.pregnancy.is_some()
    }

    /// Days pregnant, zero when open.
    pub fn days_pregnant(&self) -> u32 {
        self.pregnancy.map_or(0, |p| p.days)
    }

    /// Add a day to an established pregnancy.
    pub const fn advance_pregnancy(&mut self) {
        if let Some(pregnancy) = self.pregnancy.as_mut() {
            pregnancy.days = pregnancy.days.saturating_add(1);
        }
    }

    /// Whether an insemination is scheduled or awaiting diagnosis.
    pub const fn insemination_pending(&self) -> bool {
        self.ai_day.is_some()
    }

    /// Schedule an insemination on `day` at `rate`, applying any pending
    /// penalty.
    pub fn schedule_insemination(&mut self, day: u32, rate: f64, penalty: f64) {
        self.ai_day = Some(day);
        self.conception_rate = if self.penalty_pending {
            self.penalty_pending = false;
            (rate - penalty).max(0.0)
        } else {
            rate
        };
    }

    /// Run one day of pregnancy bookkeeping.
    ///
    /// Order: advance an existing pregnancy, resolve an insemination due
    /// today, then run whichever pregnancy check falls on today. An open or
    /// lost result clears the pregnancy and insemination and records the
    /// abortion day; the caller restarts its program.
    pub fn update(
        &mut self,
        record: &mut AnimalRecord,
        params: &PregnancyParams,
        draws: &mut dyn DrawSource,
        in_window: bool,
    ) -> Result<PregnancyEvent, AnimalError> {
        let today = record.days_born;
        self.advance_pregnancy();

        let Some(ai_day) = self.ai_day else {
            return Ok(PregnancyEvent::Quiet);
        };

        if ai_day == today {
            return self.inseminate(record, params, draws, in_window);
        }

        let due = params
            .check_days
            .iter()
            .zip(1_u8..)
            .find(|(offset, _)| ai_day.saturating_add(**offset) == today)
            .map(|(_, check)| check);
        let Some(check) = due else {
            return Ok(PregnancyEvent::Quiet);
        };

        if check == 1 && !self.is_pregnant() {
            self.count_diagnosis(in_window);
            record.log(EventKind::PregnancyCheck {
                check,
                pregnant: false,
            });
            self.reopen(today);
            return Ok(PregnancyEvent::Open);
        }
        if !self.is_pregnant() {
            return Ok(PregnancyEvent::Quiet);
        }

        self.count_diagnosis(in_window);
        let loss_rate = params
            .loss_rates
            .get(usize::from(check.saturating_sub(1)))
            .copied()
            .unwrap_or_default();
        if draws.chance(loss_rate)? {
            record.log(EventKind::PregnancyLoss { check });
            self.reopen(today);
            self.penalty_pending = true;
            return Ok(PregnancyEvent::Lost(check));
        }
        record.log(EventKind::PregnancyCheck {
            check,
            pregnant: true,
        });
        Ok(PregnancyEvent::Quiet)
    }

    fn inseminate(
        &mut self,
        record: &mut AnimalRecord,
        params: &PregnancyParams,
        draws: &mut dyn DrawSource,
        in_window: bool,
    ) -> Result<PregnancyEvent, AnimalError> {
        record.log(EventKind::Inseminated);
        if in_window {
            self.tally.record_insemination();
        }
        if !draws.chance(self.conception_rate)? {
            record.log(EventKind::NotConceived);
            return Ok(PregnancyEvent::NotConceived);
        }

        let gestation = whole_days(draws.normal(&params.gestation)?);
        if gestation == 0 {
            return Err(AnimalError::InvariantViolation {
                animal: record.id,
                context: "sampled gestation length is not positive".to_owned(),
            });
        }
        self.pregnancy = Some(Pregnancy { days: 1, gestation });
        record.log(EventKind::Conceived);
        Ok(PregnancyEvent::Conceived)
    }

    const fn count_diagnosis(&mut self, in_window: bool) {
        if in_window {
            self.tally.record_diagnosis();
        }
    }

    const fn reopen(&mut self, today: u32) {
        self.pregnancy = None;
        self.ai_day = None;
        self.abortion_day = Some(today);
    }

    /// Clear the pregnancy at calving.
    pub const fn clear_after_calving(&mut self) {
        self.pregnancy = None;
        self.ai_day = None;
    }
}
