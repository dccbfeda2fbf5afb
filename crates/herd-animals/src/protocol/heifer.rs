//! Replacement heifer reproduction programs.
//!
//! Three mutually exclusive families: estrus detection, timed
//! insemination, and synchronized estrus. Each is started once at breeding
//! age and restarted on an open diagnosis or pregnancy loss.

use serde::{Deserialize, Serialize};

use herd_types::{
    AnimalRecord, EstrusNote, EventKind, HeiferProgram, HeiferTaiProtocol, Hormone,
    SynchEstrusProtocol,
};

use super::estrus::{EstrusOutcome, observe_estrus, schedule_estrus, synchronized_delay};
use super::{StepAction, due_steps, heifer_tai_rate, heifer_tai_schedule, inject, synch_schedule};
use crate::config::HeiferBreedingParams;
use crate::day::DayContext;
use crate::error::AnimalError;
use crate::pregnancy::{PregnancyEvent, ReproState};

/// Days from the first PGF to the second PGF of the two-PGF template.
const SECOND_PGF_OFFSET: u32 = 14;

/// Days from the anchor to the next attempt after a missed second estrus.
const TWO_PGF_RESTART: u32 = 21;

/// Days from the CIDR anchor to the next attempt after a missed estrus.
const CIDR_RESTART: u32 = 14;

/// Days from CIDR insertion to the PGF injection.
const CIDR_PGF_OFFSET: u32 = 7;

/// Program state for a breeding heifer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeiferProtocol {
    /// Watch for natural estrus.
    EstrusDetection {
        /// Next expected estrus.
        estrus_day: Option<u32>,
    },
    /// Fixed injection schedule ending in insemination.
    TimedAi {
        /// Template in use.
        protocol: HeiferTaiProtocol,
        /// Day the schedule started.
        anchor: Option<u32>,
    },
    /// Injections that induce an estrus, then detection.
    SynchEstrus {
        /// Template in use.
        protocol: SynchEstrusProtocol,
        /// Day the schedule started.
        anchor: Option<u32>,
        /// Expected induced estrus.
        estrus_day: Option<u32>,
        /// Day of the second PGF after a missed first estrus.
        second_pgf_day: Option<u32>,
    },
}

impl HeiferProtocol {
    /// An unstarted program of the configured family.
    pub const fn from_params(params: &HeiferBreedingParams) -> Self {
        match params.program {
            HeiferProgram::EstrusDetection => Self::EstrusDetection { estrus_day: None },
            HeiferProgram::TimedAi => Self::TimedAi {
                protocol: params.tai_protocol,
                anchor: None,
            },
            HeiferProgram::SynchEstrus => Self::SynchEstrus {
                protocol: params.synch_protocol,
                anchor: None,
                estrus_day: None,
                second_pgf_day: None,
            },
        }
    }

    /// Start the program at breeding age.
    pub fn start(
        &mut self,
        record: &mut AnimalRecord,
        ctx: &mut DayContext<'_>,
    ) -> Result<(), AnimalError> {
        let today = record.days_born;
        let params = &ctx.params.heifer_breeding;
        match self {
            Self::EstrusDetection { estrus_day } => {
                *estrus_day = Some(schedule_estrus(
                    record,
                    today,
                    &params.estrus_cycle,
                    EstrusNote::BreedingStart,
                    ctx.draws,
                )?);
                Ok(())
            }
            Self::TimedAi { .. } | Self::SynchEstrus { .. } => self.anchor_at(record, today, ctx),
        }
    }

    /// Run today's program actions.
    pub fn step(
        &mut self,
        record: &mut AnimalRecord,
        repro: &mut ReproState,
        ctx: &mut DayContext<'_>,
    ) -> Result<(), AnimalError> {
        let today = record.days_born;
        let params = &ctx.params.heifer_breeding;
        let penalty = ctx.params.pregnancy.conception_penalty;
        let detecting = !repro.is_pregnant() && !repro.insemination_pending();

        match self {
            Self::EstrusDetection { estrus_day } => {
                if detecting && ctx.in_window {
                    repro.tally.record_estrus_detection_day();
                }
                if *estrus_day != Some(today) || !detecting {
                    return Ok(());
                }
                let outcome = observe_estrus(
                    record,
                    repro,
                    params.detection_rate,
                    params.service_rate,
                    ctx.draws,
                )?;
                match outcome {
                    EstrusOutcome::Serviced => {
                        *estrus_day = None;
                        repro.schedule_insemination(
                            today.saturating_add(1),
                            params.estrus_conception_rate,
                            penalty,
                        );
                    }
                    EstrusOutcome::NotDetected | EstrusOutcome::NotServiced => {
                        *estrus_day = Some(schedule_estrus(
                            record,
                            today,
                            &params.estrus_cycle,
                            EstrusNote::Repeat,
                            ctx.draws,
                        )?);
                    }
                }
                Ok(())
            }
            Self::TimedAi { protocol, anchor } => {
                let Some(anchor) = *anchor else {
                    return Ok(());
                };
                let schedule = heifer_tai_schedule(*protocol, params);
                for action in due_steps(&schedule, anchor, today) {
                    match action {
                        StepAction::Inject(hormone) => {
                            inject(record, repro, hormone, today, ctx.in_window);
                        }
                        StepAction::Inseminate => repro.schedule_insemination(
                            today,
                            heifer_tai_rate(*protocol, params),
                            penalty,
                        ),
                        StepAction::BeginTimedAi => {}
                    }
                }
                Ok(())
            }
            Self::SynchEstrus {
                protocol,
                anchor,
                estrus_day,
                second_pgf_day,
            } => {
                let Some(start) = *anchor else {
                    return Ok(());
                };
                for action in due_steps(synch_schedule(*protocol), start, today) {
                    if let StepAction::Inject(hormone) = action {
                        inject(record, repro, hormone, today, ctx.in_window);
                    }
                }
                if *second_pgf_day == Some(today) {
                    inject(record, repro, Hormone::Pgf, today, ctx.in_window);
                }
                if detecting && ctx.in_window {
                    repro.tally.record_estrus_detection_day();
                }
                if *estrus_day != Some(today) || !detecting {
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
                    *estrus_day = None;
                    repro.schedule_insemination(
                        today.saturating_add(1),
                        params.estrus_conception_rate,
                        penalty,
                    );
                    return Ok(());
                }

                let protocol = *protocol;
                if protocol == SynchEstrusProtocol::TwoPgf && second_pgf_day.is_none() {
                    let second = start.saturating_add(SECOND_PGF_OFFSET);
                    let delay = synchronized_delay(
                        &params.synch_second_estrus,
                        params.synch_second_estrus_max,
                        ctx.draws,
                    )?;
                    *second_pgf_day = Some(second);
                    let day = second.saturating_add(delay);
                    *estrus_day = Some(day);
                    record.log_on(day, EventKind::Estrus(EstrusNote::Synchronized));
                    return Ok(());
                }
                let restart = match protocol {
                    SynchEstrusProtocol::TwoPgf => TWO_PGF_RESTART,
                    SynchEstrusProtocol::CidrPgf => CIDR_RESTART,
                };
                self.anchor_at(record, start.saturating_add(restart), ctx)
            }
        }
    }

    /// React to the day's pregnancy outcome.
    ///
    /// A failed insemination sends an estrus-detection heifer back to
    /// watching for estrus. An open diagnosis or loss restarts the program:
    /// estrus detection from today, timed and synchronized schedules from
    /// tomorrow.
    pub fn after_pregnancy(
        &mut self,
        event: PregnancyEvent,
        record: &mut AnimalRecord,
        repro: &mut ReproState,
        ctx: &mut DayContext<'_>,
    ) -> Result<(), AnimalError> {
        let today = record.days_born;
        if let Self::EstrusDetection { estrus_day } = self {
            let note = match event {
                PregnancyEvent::NotConceived => {
                    repro.ai_day = None;
                    EstrusNote::AfterInsemination
                }
                event if event.reopens() => EstrusNote::AfterPregnancyLoss,
                _ => return Ok(()),
            };
            *estrus_day = Some(schedule_estrus(
                record,
                today,
                &ctx.params.heifer_breeding.estrus_cycle,
                note,
                ctx.draws,
            )?);
            return Ok(());
        }
        if event.reopens() {
            self.anchor_at(record, today.saturating_add(1), ctx)?;
        }
        Ok(())
    }

    /// Anchor a timed or synchronized schedule on `day`.
    fn anchor_at(
        &mut self,
        record: &mut AnimalRecord,
        day: u32,
        ctx: &mut DayContext<'_>,
    ) -> Result<(), AnimalError> {
        let params = &ctx.params.heifer_breeding;
        match self {
            Self::EstrusDetection { .. } => Ok(()),
            Self::TimedAi { protocol, anchor } => {
                *anchor = Some(day);
                record.log_on(day, EventKind::ProtocolStarted(protocol.tag().to_owned()));
                Ok(())
            }
            Self::SynchEstrus {
                protocol,
                anchor,
                estrus_day,
                second_pgf_day,
            } => {
                let estrus = match protocol {
                    SynchEstrusProtocol::TwoPgf => day.saturating_add(synchronized_delay(
                        &params.synch_first_estrus,
                        params.synch_first_estrus_max,
                        ctx.draws,
                    )?),
                    SynchEstrusProtocol::CidrPgf => day
                        .saturating_add(CIDR_PGF_OFFSET)
                        .saturating_add(synchronized_delay(
                            &params.synch_second_estrus,
                            params.synch_second_estrus_max,
                            ctx.draws,
                        )?),
                };
                *anchor = Some(day);
                *estrus_day = Some(estrus);
                *second_pgf_day = None;
                record.log_on(day, EventKind::ProtocolStarted(protocol.tag().to_owned()));
                record.log_on(estrus, EventKind::Estrus(EstrusNote::Synchronized));
                Ok(())
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::AnimalParams;
    use crate::draws::ScriptedDraws;
    use herd_ledger::PriceList;
    use herd_types::{AnimalId, Breed};

    fn record(day: u32) -> AnimalRecord {
        AnimalRecord::new(AnimalId(5), Breed::Holstein, 0, day)
    }

    fn params_for(program: HeiferProgram) -> AnimalParams {
        let mut params = AnimalParams::default();
        params.heifer_breeding.program = program;
        params
    }

    fn injections_on(rec: &AnimalRecord, day: u32) -> Vec<Hormone> {
        rec.events
            .on_day(day)
            .filter_map(|e| match e.kind {
                EventKind::Injection(h) => Some(h),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn five_day_cg2p_runs_to_insemination() {
        let params = params_for(HeiferProgram::TimedAi);
        let prices = PriceList::default();
        let mut draws = ScriptedDraws::default();
        let mut ctx = DayContext {
            params: &params,
            prices: &prices,
            draws: &mut draws,
            in_window: true,
        };
        let mut rec = record(380);
        let mut repro = ReproState::default();
        let mut program = HeiferProtocol::from_params(&params.heifer_breeding);

        program.start(&mut rec, &mut ctx).unwrap();
        for day in 380..=388 {
            rec.days_born = day;
            program.step(&mut rec, &mut repro, &mut ctx).unwrap();
        }

        assert_eq!(injections_on(&rec, 380), vec![Hormone::Gnrh]);
        assert_eq!(injections_on(&rec, 385), vec![Hormone::Pgf]);
        assert_eq!(injections_on(&rec, 386), vec![Hormone::Pgf]);
        assert_eq!(injections_on(&rec, 388), vec![Hormone::Gnrh]);
        assert_eq!(repro.ai_day, Some(388));
        assert!((repro.conception_rate - 0.6).abs() < 1e-12);
        assert_eq!(repro.tally.gnrh, 2);
        assert_eq!(repro.tally.pgf, 2);
    }

    #[test]
    fn estrus_detection_services_day_after_estrus() {
        let params = params_for(HeiferProgram::EstrusDetection);
        let prices = PriceList::default();
        let mut draws = ScriptedDraws::new([0.0, 0.0]).with_normals([4.0]);
        let mut ctx = DayContext {
            params: &params,
            prices: &prices,
            draws: &mut draws,
            in_window: false,
        };
        let mut rec = record(380);
        let mut repro = ReproState::default();
        let mut program = HeiferProtocol::from_params(&params.heifer_breeding);

        program.start(&mut rec, &mut ctx).unwrap();
        assert_eq!(program, HeiferProtocol::EstrusDetection { estrus_day: Some(384) });
        for day in 381..=384 {
            rec.days_born = day;
            program.step(&mut rec, &mut repro, &mut ctx).unwrap();
        }
        assert_eq!(repro.ai_day, Some(385));
        assert_eq!(repro.estrus_count, 1);
    }

    #[test]
    fn failed_conception_reschedules_estrus_later() {
        let params = params_for(HeiferProgram::EstrusDetection);
        let prices = PriceList::default();
        let mut draws = ScriptedDraws::default();
        let mut ctx = DayContext {
            params: &params,
            prices: &prices,
            draws: &mut draws,
            in_window: false,
        };
        let mut rec = record(400);
        let mut repro = ReproState {
            ai_day: Some(400),
            ..ReproState::default()
        };
        let mut program = HeiferProtocol::EstrusDetection { estrus_day: None };

        program
            .after_pregnancy(PregnancyEvent::NotConceived, &mut rec, &mut repro, &mut ctx)
            .unwrap();
        assert_eq!(repro.ai_day, None);
        assert_eq!(program, HeiferProtocol::EstrusDetection { estrus_day: Some(421) });
    }

    #[test]
    fn open_timed_heifer_resynchronizes_next_day() {
        let params = params_for(HeiferProgram::TimedAi);
        let prices = PriceList::default();
        let mut draws = ScriptedDraws::default();
        let mut ctx = DayContext {
            params: &params,
            prices: &prices,
            draws: &mut draws,
            in_window: false,
        };
        let mut rec = record(420);
        let mut repro = ReproState::default();
        let mut program = HeiferProtocol::from_params(&params.heifer_breeding);

        program
            .after_pregnancy(PregnancyEvent::Open, &mut rec, &mut repro, &mut ctx)
            .unwrap();
        assert!(matches!(program, HeiferProtocol::TimedAi { anchor: Some(421), .. }));
    }

    #[test]
    fn two_pgf_missed_estrus_adds_second_pgf() {
        let mut params = params_for(HeiferProgram::SynchEstrus);
        params.heifer_breeding.synch_protocol = SynchEstrusProtocol::TwoPgf;
        let prices = PriceList::default();
        // Estrus delays 5 then 3; detection fails once.
        let mut draws = ScriptedDraws::new([0.99]).with_normals([5.0, 3.0]);
        let mut ctx = DayContext {
            params: &params,
            prices: &prices,
            draws: &mut draws,
            in_window: true,
        };
        let mut rec = record(380);
        let mut repro = ReproState::default();
        let mut program = HeiferProtocol::from_params(&params.heifer_breeding);

        program.start(&mut rec, &mut ctx).unwrap();
        for day in 380..=394 {
            rec.days_born = day;
            program.step(&mut rec, &mut repro, &mut ctx).unwrap();
        }
        assert_eq!(injections_on(&rec, 380), vec![Hormone::Pgf]);
        assert_eq!(injections_on(&rec, 394), vec![Hormone::Pgf]);
        assert!(matches!(
            program,
            HeiferProtocol::SynchEstrus {
                estrus_day: Some(397),
                second_pgf_day: Some(394),
                ..
            }
        ));
    }
}
