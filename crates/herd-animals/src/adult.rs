//! The lactating adult: calving, milking, breeding, culling, and accrual.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use herd_ledger::{
    CostAccrual, DailyAccrual, EconomicSummary, PriceList, ProtocolTally, Settlement,
};
use herd_types::{AnimalRecord, CullReason, EventKind, Stage};

use crate::animal::LifeStage;
use crate::config::AnimalParams;
use crate::culling::{ScheduledCull, schedule_health_cull};
use crate::day::{DayContext, DayOutcome};
use crate::error::AnimalError;
use crate::growth::Growth;
use crate::heifer::PreCalvingHeifer;
use crate::lactation::{
    BodyWeightInputs, CurveShape, adult_body_weight, dry_matter_intake, fat_corrected_milk,
    fat_percent,
};
use crate::pregnancy::ReproState;
use crate::protocol::CowProtocol;

/// An animal in the milking herd.
///
/// The adult never changes stage again. Each calving bumps parity, resets
/// the milking sub-state, and restarts the breeding program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adult {
    /// Base record.
    pub record: AnimalRecord,
    /// Body weight.
    pub growth: Growth,
    /// Insemination and pregnancy state.
    pub repro: ReproState,
    /// Breeding program.
    pub protocol: CowProtocol,
    /// Completed calvings.
    pub parity: u32,
    /// Currently milking.
    pub milking: bool,
    /// Days in milk this lactation.
    pub days_in_milk: u32,
    /// Curve shape sampled at the last calving.
    pub curve: Option<CurveShape>,
    /// Today's milk yield, in kilograms.
    pub milk_yield: f64,
    /// Milk this lactation, in kilograms.
    pub lactation_milk: f64,
    /// Today's fat percentage.
    pub fat_percent: f64,
    /// Today's fat-corrected milk, in kilograms.
    pub fat_corrected_milk: f64,
    /// Today's dry-matter intake, in kilograms.
    pub dry_matter_intake: f64,
    /// Pending health cull.
    pub health_cull: Option<ScheduledCull>,
    /// Feed, fixed cost, and milk income.
    pub accrual: CostAccrual,
}

impl Adult {
    /// Enter the milking herd from the pre-calving stage.
    ///
    /// Pregnancy and insemination state carry over; the billable tally
    /// starts empty.
    pub fn from_heifer(heifer: PreCalvingHeifer, params: &AnimalParams) -> Self {
        let mut record = heifer.record;
        record.log_on(
            record.days_born.saturating_add(1),
            EventKind::Promoted(Self::STAGE),
        );
        let repro = ReproState {
            tally: ProtocolTally::default(),
            ..heifer.repro
        };
        Self {
            record,
            growth: heifer.growth,
            repro,
            protocol: CowProtocol::new(params.cow_breeding.program),
            parity: 0,
            milking: false,
            days_in_milk: 0,
            curve: None,
            milk_yield: 0.0,
            lactation_milk: 0.0,
            fat_percent: 0.0,
            fat_corrected_milk: 0.0,
            dry_matter_intake: params.lactation.dry_matter_intake_dry,
            health_cull: None,
            accrual: CostAccrual::new(),
        }
    }

    /// Settle the economic summary when the adult leaves the herd or the
    /// run ends.
    pub fn settle(
        &self,
        culled: bool,
        in_window: bool,
        prices: &PriceList,
    ) -> Result<EconomicSummary, AnimalError> {
        Ok(EconomicSummary::settle(
            &Settlement {
                animal: self.record.id,
                culled,
                in_window,
                body_weight: self.growth.body_weight,
                tally: &self.repro.tally,
                accrual: &self.accrual,
            },
            prices,
        )?)
    }

    fn calve(&mut self, ctx: &mut DayContext<'_>) -> Result<(), AnimalError> {
        let today = self.record.days_born;
        self.parity = self.parity.saturating_add(1);
        self.milking = true;
        self.days_in_milk = 0;
        self.lactation_milk = 0.0;
        self.repro.clear_after_calving();
        self.record.log(EventKind::Calved {
            parity: self.parity,
        });
        tracing::trace!(animal = %self.record.id, parity = self.parity, day = today, "Calved");

        if let Some(cull) =
            schedule_health_cull(&ctx.params.culling, self.parity, today, ctx.draws)?
        {
            self.record.log(EventKind::HealthCullScheduled {
                reason: cull.reason,
                day: cull.day,
            });
            self.health_cull = Some(cull);
        }

        self.protocol.restart_after_calving(&mut self.record, ctx)?;
        self.curve = Some(CurveShape::sample(
            &ctx.params.lactation,
            self.record.breed,
            self.parity,
            ctx.draws,
        )?);
        Ok(())
    }

    fn milk(&mut self, ctx: &mut DayContext<'_>) -> Result<(), AnimalError> {
        let params = ctx.params;
        if self
            .repro
            .pregnancy
            .is_some_and(|p| p.within(params.lactation.dry_period))
        {
            self.milking = false;
            self.days_in_milk = 0;
            self.milk_yield = 0.0;
            self.fat_percent = 0.0;
            self.fat_corrected_milk = 0.0;
            self.record.log(EventKind::DriedOff);
            return Ok(());
        }

        self.days_in_milk = self.days_in_milk.saturating_add(1);
        let dim = self.days_in_milk;
        let Some(curve) = self.curve else {
            return Err(AnimalError::InvariantViolation {
                animal: self.record.id,
                context: "milking without a sampled lactation curve".to_owned(),
            });
        };
        self.milk_yield = curve.daily_yield(dim);
        self.lactation_milk += self.milk_yield;
        self.fat_percent = fat_percent(dim);
        self.fat_corrected_milk = fat_corrected_milk(self.milk_yield, self.fat_percent);
        self.growth.body_weight = adult_body_weight(&BodyWeightInputs {
            mature_weight: self.growth.mature_or(params.growth.mature_body_weight),
            birth_weight: self.growth.birth_weight,
            age: self.record.days_born,
            parity: self.parity,
            days_in_milk: dim,
            days_pregnant: self.repro.days_pregnant(),
        });
        self.dry_matter_intake =
            dry_matter_intake(self.fat_corrected_milk, self.growth.body_weight, dim);

        if !self.record.do_not_breed {
            self.protocol
                .step(&mut self.record, &mut self.repro, dim, ctx)?;
        }
        Ok(())
    }

    fn low_production(&self, params: &AnimalParams) -> bool {
        let lifetime = self.accrual.lifetime();
        self.record.do_not_breed
            && self.days_in_milk > params.culling.low_production_min_days_in_milk
            && lifetime
                .feed_cost
                .checked_div(Decimal::TWO)
                .is_some_and(|half| lifetime.milk_income < half)
    }
}

impl LifeStage for Adult {
    const STAGE: Stage = Stage::LactatingAdult;

    fn record(&self) -> &AnimalRecord {
        &self.record
    }

    /// Daily order: calving, milking and breeding, pregnancy, do-not-breed,
    /// culling, then accrual.
    fn advance(&mut self, ctx: &mut DayContext<'_>) -> Result<DayOutcome, AnimalError> {
        let params = ctx.params;
        let today = self.record.advance_day();

        let calved = self
            .repro
            .pregnancy
            .is_some_and(|p| p.days >= p.gestation);
        if calved {
            self.calve(ctx)?;
        }

        if self.milking {
            self.milk(ctx)?;
        } else {
            self.milk_yield = 0.0;
            self.dry_matter_intake = params.lactation.dry_matter_intake_dry;
        }

        let event = self
            .repro
            .update(&mut self.record, &params.pregnancy, ctx.draws, ctx.in_window)?;
        if !self.record.do_not_breed {
            self.protocol
                .after_pregnancy(event, &mut self.record, &mut self.repro, ctx)?;
        }

        if !self.record.do_not_breed
            && !self.repro.is_pregnant()
            && self.days_in_milk > params.cow_breeding.do_not_breed_day
        {
            self.record.do_not_breed = true;
            self.record.log(EventKind::DoNotBreed);
        }

        let culled = if self.low_production(params) {
            Some(CullReason::LowProduction)
        } else {
            self.health_cull
                .filter(|cull| cull.day == today)
                .map(|cull| cull.reason)
        };

        self.accrual.accrue(
            &DailyAccrual {
                dry_matter_intake: self.dry_matter_intake,
                milk_yield: self.milk_yield,
                milking: self.milking,
                culled_today: culled.is_some(),
            },
            ctx.prices,
            ctx.in_window,
        )?;

        let mut outcome = culled.map_or_else(DayOutcome::stay, |reason| {
            self.record.culled = true;
            self.record.log(EventKind::Culled(reason));
            tracing::debug!(animal = %self.record.id, %reason, day = today, "Adult culled");
            DayOutcome::cull(reason)
        });
        outcome.calved = calved;
        Ok(outcome)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::draws::ScriptedDraws;
    use crate::pregnancy::Pregnancy;
    use herd_types::{AnimalId, Breed, CowProgram, Hormone};

    fn term_heifer() -> PreCalvingHeifer {
        PreCalvingHeifer {
            record: AnimalRecord::new(AnimalId(31), Breed::Holstein, 0, 700),
            growth: Growth::new(40.0, 560.0),
            repro: ReproState {
                ai_day: Some(424),
                pregnancy: Some(Pregnancy {
                    days: 277,
                    gestation: 277,
                }),
                ..ReproState::default()
            },
        }
    }

    #[test]
    fn heifer_tally_does_not_follow_into_the_milking_herd() {
        let params = AnimalParams::default();
        let prices = PriceList::default();
        let mut heifer = term_heifer();
        heifer.repro.tally.record_injection(Hormone::Gnrh);
        heifer.repro.tally.record_injection(Hormone::Pgf);
        heifer.repro.tally.record_insemination();
        heifer.repro.tally.diagnoses = 1;
        heifer.repro.tally.estrus_detection_days = 4;

        let adult = Adult::from_heifer(heifer, &params);
        assert_eq!(adult.repro.tally, ProtocolTally::default());
        assert_eq!(adult.repro.ai_day, Some(424));
        assert_eq!(adult.repro.days_pregnant(), 277);

        let summary = adult.settle(false, true, &prices).unwrap();
        assert_eq!(summary.breeding_cost, Decimal::ZERO);
        assert_eq!(summary.semen_cost, Decimal::ZERO);
        assert_eq!(summary.insemination_cost, Decimal::ZERO);
        assert_eq!(summary.diagnosis_cost, Decimal::ZERO);
    }

    #[test]
    fn adult_calves_on_first_tick_at_term() {
        let params = AnimalParams::default();
        let prices = PriceList::default();
        // Health-cull gate fails.
        let mut draws = ScriptedDraws::new([0.99]).repeating(0.5);
        let mut ctx = DayContext {
            params: &params,
            prices: &prices,
            draws: &mut draws,
            in_window: true,
        };
        let mut adult = Adult::from_heifer(term_heifer(), &params);
        let outcome = adult.advance(&mut ctx).unwrap();

        assert!(outcome.calved);
        assert_eq!(outcome.transition, None);
        assert_eq!(adult.parity, 1);
        assert!(adult.milking);
        assert_eq!(adult.days_in_milk, 1);
        assert!(!adult.repro.is_pregnant());
        assert_eq!(adult.repro.ai_day, None);
        assert!(adult.milk_yield > 0.0);
        assert_eq!(adult.record.days_born, 701);
        assert_eq!(adult.accrual.window_days(), 1);
    }

    #[test]
    fn scheduled_health_cull_fires_on_its_day() {
        let params = AnimalParams::default();
        let prices = PriceList::default();
        let mut draws = ScriptedDraws::new([0.99]).repeating(0.5);
        let mut ctx = DayContext {
            params: &params,
            prices: &prices,
            draws: &mut draws,
            in_window: true,
        };
        let mut adult = Adult::from_heifer(term_heifer(), &params);
        adult.advance(&mut ctx).unwrap();
        adult.health_cull = Some(ScheduledCull {
            reason: CullReason::Mastitis,
            day: 703,
        });

        assert_eq!(adult.advance(&mut ctx).unwrap().culled(), None);
        let outcome = adult.advance(&mut ctx).unwrap();
        assert_eq!(outcome.culled(), Some(CullReason::Mastitis));
        assert!(adult.record.culled);

        let summary = adult.settle(true, true, &prices).unwrap();
        assert!(summary.slaughter_value > Decimal::ZERO);
        assert_eq!(summary.window_days, 3);
    }

    #[test]
    fn dries_off_before_calving() {
        let params = AnimalParams::default();
        let prices = PriceList::default();
        let mut draws = ScriptedDraws::default().repeating(0.5);
        let mut ctx = DayContext {
            params: &params,
            prices: &prices,
            draws: &mut draws,
            in_window: false,
        };
        let mut adult = Adult::from_heifer(term_heifer(), &params);
        adult.milking = true;
        adult.parity = 1;
        adult.days_in_milk = 250;
        adult.curve = Some(CurveShape::Wood {
            l: 20.0,
            m: 0.2,
            n: 0.004,
        });
        adult.repro.ai_day = Some(500);
        adult.repro.pregnancy = Some(Pregnancy {
            days: 280 - params.lactation.dry_period,
            gestation: 280,
        });

        adult.advance(&mut ctx).unwrap();
        assert!(!adult.milking);
        assert_eq!(adult.days_in_milk, 0);
        assert_eq!(adult.milk_yield, 0.0);
        assert_eq!(adult.dry_matter_intake, params.lactation.dry_matter_intake_dry);
        assert!(matches!(
            adult.record.events.last().map(|e| &e.kind),
            Some(EventKind::DriedOff)
        ));
    }

    #[test]
    fn open_adult_past_threshold_is_flagged_do_not_breed() {
        let mut params = AnimalParams::default();
        params.cow_breeding.program = CowProgram::TimedAi;
        let prices = PriceList::default();
        let mut draws = ScriptedDraws::default().repeating(0.5);
        let mut ctx = DayContext {
            params: &params,
            prices: &prices,
            draws: &mut draws,
            in_window: false,
        };
        let mut adult = Adult::from_heifer(term_heifer(), &params);
        adult.repro = ReproState::default();
        adult.milking = true;
        adult.parity = 2;
        adult.days_in_milk = params.cow_breeding.do_not_breed_day;
        adult.curve = Some(CurveShape::Wood {
            l: 20.0,
            m: 0.2,
            n: 0.004,
        });

        adult.advance(&mut ctx).unwrap();
        assert!(adult.record.do_not_breed);
        let flagged = adult
            .record
            .events
            .count_where(|k| matches!(k, EventKind::DoNotBreed));
        adult.advance(&mut ctx).unwrap();
        let flagged_again = adult
            .record
            .events
            .count_where(|k| matches!(k, EventKind::DoNotBreed));
        assert_eq!(flagged, 1);
        assert_eq!(flagged_again, 1);
        assert_eq!(
            adult
                .record
                .events
                .count_where(|k| matches!(k, EventKind::Injection(Hormone::Gnrh))),
            0
        );
    }
}
