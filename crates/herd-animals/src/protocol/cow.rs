//! Adult reproduction programs.
//!
//! An adult runs estrus detection, timed insemination (optionally behind a
//! presynchronization template), or estrus detection until a cutoff and
//! timed insemination after it. Open diagnoses and pregnancy losses are
//! routed through the configured resynchronization policy.

use serde::{Deserialize, Serialize};

use herd_types::{AnimalRecord, CowProgram, EstrusNote, EventKind, Hormone, ResynchPolicy};

use super::estrus::{EstrusOutcome, observe_estrus, schedule_estrus};
use super::{StepAction, cow_tai_rate, cow_tai_schedule, due_steps, inject, presynch_schedule};
use crate::config::{CowBreedingParams, PresynchChoice};
use crate::day::DayContext;
use crate::error::AnimalError;
use crate::pregnancy::{PregnancyEvent, ReproState};

/// Days before the diagnosis at which a before-diagnosis resynch is anchored.
const RESYNCH_LEAD: u32 = 6;

/// Days after the diagnosis at which a PGF-at-diagnosis resynch is anchored.
const PGF_RESYNCH_DELAY: u32 = 8;

/// Program state for a lactating adult.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CowProtocol {
    /// Program family.
    pub program: CowProgram,
    /// Next expected estrus, when detection is active.
    pub estrus_day: Option<u32>,
    /// Anchor of a running presynchronization template.
    pub presynch_anchor: Option<u32>,
    /// Anchor of a running timed-insemination template.
    pub tai_anchor: Option<u32>,
    /// Estrus-then-TAI has switched to timed insemination this lactation.
    pub timed_phase: bool,
}

impl CowProtocol {
    /// An idle program of the given family.
    pub const fn new(program: CowProgram) -> Self {
        Self {
            program,
            estrus_day: None,
            presynch_anchor: None,
            tai_anchor: None,
            timed_phase: false,
        }
    }

    const fn detects_estrus(&self) -> bool {
        match self.program {
            CowProgram::EstrusDetection => true,
            CowProgram::TimedAi => false,
            CowProgram::EstrusThenTimedAi => !self.timed_phase,
        }
    }

    /// Reset for a new lactation and restart estrus cycling where the
    /// program detects estrus.
    pub fn restart_after_calving(
        &mut self,
        record: &mut AnimalRecord,
        ctx: &mut DayContext<'_>,
    ) -> Result<(), AnimalError> {
        let today = record.days_born;
        *self = Self::new(self.program);
        if self.detects_estrus() {
            self.estrus_day = Some(schedule_estrus(
                record,
                today,
                &ctx.params.cow_breeding.estrus_after_calving,
                EstrusNote::AfterCalving,
                ctx.draws,
            )?);
        }
        Ok(())
    }

    /// Run today's program actions for a milking adult.
    pub fn step(
        &mut self,
        record: &mut AnimalRecord,
        repro: &mut ReproState,
        days_in_milk: u32,
        ctx: &mut DayContext<'_>,
    ) -> Result<(), AnimalError> {
        let today = record.days_born;
        let params = &ctx.params.cow_breeding;

        match self.program {
            CowProgram::EstrusDetection => self.estrus_step(record, repro, days_in_milk, ctx),
            CowProgram::TimedAi => {
                if days_in_milk == params.voluntary_waiting_period {
                    self.begin_timed(record, today, params);
                }
                self.walk(record, repro, ctx);
                Ok(())
            }
            CowProgram::EstrusThenTimedAi => {
                if !self.timed_phase
                    && days_in_milk == params.tai_cutoff_day
                    && !repro.insemination_pending()
                    && !repro.is_pregnant()
                {
                    self.timed_phase = true;
                    self.estrus_day = None;
                    self.tai_anchor = Some(today);
                    record.log(EventKind::ProtocolStarted(params.tai_protocol.tag().to_owned()));
                }
                if self.timed_phase {
                    self.walk(record, repro, ctx);
                    if self.estrus_day.is_some() {
                        self.estrus_step(record, repro, days_in_milk, ctx)?;
                    }
                    Ok(())
                } else {
                    self.estrus_step(record, repro, days_in_milk, ctx)
                }
            }
        }
    }

    /// Start presynchronization, or timed insemination directly, today.
    fn begin_timed(&mut self, record: &mut AnimalRecord, today: u32, params: &CowBreedingParams) {
        match params.presynch {
            PresynchChoice::Run(protocol) => {
                self.presynch_anchor = Some(today);
                record.log(EventKind::ProtocolStarted(protocol.tag().to_owned()));
            }
            PresynchChoice::Skip => {
                self.tai_anchor = Some(today);
                record.log(EventKind::ProtocolStarted(params.tai_protocol.tag().to_owned()));
            }
        }
    }

    /// Walk the presynchronization then timed-insemination schedules.
    fn walk(&mut self, record: &mut AnimalRecord, repro: &mut ReproState, ctx: &DayContext<'_>) {
        let today = record.days_born;
        let params = &ctx.params.cow_breeding;
        let penalty = ctx.params.pregnancy.conception_penalty;

        if let (Some(anchor), PresynchChoice::Run(protocol)) = (self.presynch_anchor, params.presynch) {
            let schedule = presynch_schedule(protocol, params);
            for action in due_steps(&schedule, anchor, today) {
                match action {
                    StepAction::Inject(hormone) => {
                        inject(record, repro, hormone, today, ctx.in_window);
                    }
                    StepAction::BeginTimedAi => {
                        self.presynch_anchor = None;
                        self.tai_anchor = Some(today);
                        record.log(EventKind::ProtocolStarted(params.tai_protocol.tag().to_owned()));
                    }
                    StepAction::Inseminate => {}
                }
            }
        }

        if let Some(anchor) = self.tai_anchor {
            let schedule = cow_tai_schedule(params.tai_protocol, params);
            for action in due_steps(&schedule, anchor, today) {
                match action {
                    StepAction::Inject(hormone) => {
                        inject(record, repro, hormone, today, ctx.in_window);
                    }
                    StepAction::Inseminate => {
                        repro.schedule_insemination(
                            today,
                            cow_tai_rate(params.tai_protocol, params),
                            penalty,
                        );
                    }
                    StepAction::BeginTimedAi => {}
                }
            }
        }
    }

    /// Estrus detection for one day.
    fn estrus_step(
        &mut self,
        record: &mut AnimalRecord,
        repro: &mut ReproState,
        days_in_milk: u32,
        ctx: &mut DayContext<'_>,
    ) -> Result<(), AnimalError> {
        let today = record.days_born;
        let params = &ctx.params.cow_breeding;
        let open = !repro.is_pregnant() && !repro.insemination_pending();

        if open && ctx.in_window && days_in_milk > params.voluntary_waiting_period {
            repro.tally.record_estrus_detection_day();
        }
        if self.estrus_day != Some(today) {
            return Ok(());
        }
        if !open {
            self.estrus_day = None;
            return Ok(());
        }

        if (1..=params.voluntary_waiting_period).contains(&days_in_milk) {
            repro.estrus_count = repro.estrus_count.saturating_add(1);
            self.estrus_day = Some(schedule_estrus(
                record,
                today,
                &params.estrus_cycle,
                EstrusNote::BeforeWaitingPeriod,
                ctx.draws,
            )?);
            return Ok(());
        }

        let outcome = observe_estrus(
            record,
            repro,
            params.detection_rate,
            params.service_rate,
            ctx.draws,
        )?;
        if outcome == EstrusOutcome::Serviced {
            self.estrus_day = None;
            self.tai_anchor = None;
            repro.schedule_insemination(
                today.saturating_add(1),
                params.estrus_conception_rate,
                ctx.params.pregnancy.conception_penalty,
            );
        } else {
            self.estrus_day = Some(schedule_estrus(
                record,
                today,
                &params.estrus_cycle,
                EstrusNote::Repeat,
                ctx.draws,
            )?);
        }
        Ok(())
    }

    /// React to the day's pregnancy outcome.
    pub fn after_pregnancy(
        &mut self,
        event: PregnancyEvent,
        record: &mut AnimalRecord,
        repro: &mut ReproState,
        ctx: &mut DayContext<'_>,
    ) -> Result<(), AnimalError> {
        let today = record.days_born;
        let params = &ctx.params.cow_breeding;

        if self.detects_estrus() {
            let note = match event {
                PregnancyEvent::NotConceived => {
                    repro.ai_day = None;
                    EstrusNote::AfterInsemination
                }
                event if event.reopens() => EstrusNote::AfterPregnancyLoss,
                _ => return Ok(()),
            };
            self.estrus_day = Some(schedule_estrus(
                record,
                today,
                &params.estrus_cycle,
                note,
                ctx.draws,
            )?);
            return Ok(());
        }
        if !event.reopens() {
            return Ok(());
        }

        self.presynch_anchor = None;
        repro.penalty_pending = true;
        match params.resynch_policy {
            ResynchPolicy::TaiAfterDiagnosis => {
                self.tai_anchor = Some(today.saturating_add(1));
            }
            ResynchPolicy::TaiBeforeDiagnosis => {
                let anchor = today.saturating_sub(RESYNCH_LEAD);
                if params.tai_protocol.needs_preparatory_gnrh() {
                    inject(record, repro, Hormone::Gnrh, anchor, ctx.in_window);
                }
                self.tai_anchor = Some(anchor);
            }
            ResynchPolicy::PgfAtDiagnosis => {
                inject(record, repro, Hormone::Pgf, today, ctx.in_window);
                self.tai_anchor = Some(today.saturating_add(PGF_RESYNCH_DELAY));
                if self.program == CowProgram::EstrusThenTimedAi {
                    self.estrus_day = Some(schedule_estrus(
                        record,
                        today,
                        &params.estrus_after_pgf,
                        EstrusNote::Synchronized,
                        ctx.draws,
                    )?);
                }
            }
        }
        if let Some(anchor) = self.tai_anchor {
            record.log_on(anchor, EventKind::ProtocolStarted(params.tai_protocol.tag().to_owned()));
        }
        Ok(())
    }
}
