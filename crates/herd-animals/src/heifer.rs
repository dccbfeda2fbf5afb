//! Replacement heifers: growing, breeding, and pre-calving stages.
//!
//! All three share the growth rule in [`Growth`]. Promotion is an explicit
//! copy-construct: each successor takes its predecessor's fields by value
//! and adds its own.

use serde::{Deserialize, Serialize};

use herd_types::{AnimalRecord, CullReason, EventKind, Stage};

use crate::animal::LifeStage;
use crate::calf::Calf;
use crate::day::{DayContext, DayOutcome};
use crate::error::AnimalError;
use crate::growth::Growth;
use crate::pregnancy::ReproState;
use crate::protocol::HeiferProtocol;

/// Log the promotion on the day the successor will perform.
fn log_promotion(record: &mut AnimalRecord, stage: Stage) {
    record.log_on(record.days_born.saturating_add(1), EventKind::Promoted(stage));
}

// ---------------------------------------------------------------------------
// Growing
// ---------------------------------------------------------------------------

/// A weaned heifer growing toward breeding age.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowingHeifer {
    /// Base record.
    pub record: AnimalRecord,
    /// Body weight.
    pub growth: Growth,
}

impl TryFrom<Calf> for GrowingHeifer {
    type Error = AnimalError;

    fn try_from(calf: Calf) -> Result<Self, Self::Error> {
        let (Some(birth_weight), Some(body_weight)) = (calf.birth_weight, calf.body_weight) else {
            return Err(AnimalError::InvariantViolation {
                animal: calf.record.id,
                context: "promoted a calf without birth weight".to_owned(),
            });
        };
        let mut record = calf.record;
        log_promotion(&mut record, Self::STAGE);
        Ok(Self {
            record,
            growth: Growth::new(birth_weight, body_weight),
        })
    }
}

impl LifeStage for GrowingHeifer {
    const STAGE: Stage = Stage::GrowingReplacement;

    fn record(&self) -> &AnimalRecord {
        &self.record
    }

    fn advance(&mut self, ctx: &mut DayContext<'_>) -> Result<DayOutcome, AnimalError> {
        let params = &ctx.params.growth;
        let day = self.record.advance_day();
        if day == params.breeding_start_day {
            self.record.log(EventKind::BreedingStart);
            self.record.suppress_day();
            return Ok(DayOutcome::promote());
        }
        self.growth.advance(&mut self.record, params, ctx.draws)?;
        Ok(DayOutcome::stay())
    }
}

// ---------------------------------------------------------------------------
// Breeding
// ---------------------------------------------------------------------------

/// A heifer old enough to breed, running the replacement program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreedingHeifer {
    /// Base record.
    pub record: AnimalRecord,
    /// Body weight.
    pub growth: Growth,
    /// Insemination and pregnancy state.
    pub repro: ReproState,
    /// Started on the first breeding day.
    pub program: Option<HeiferProtocol>,
}

impl From<GrowingHeifer> for BreedingHeifer {
    fn from(heifer: GrowingHeifer) -> Self {
        let mut record = heifer.record;
        log_promotion(&mut record, Self::STAGE);
        Self {
            record,
            growth: heifer.growth,
            repro: ReproState::default(),
            program: None,
        }
    }
}

impl LifeStage for BreedingHeifer {
    const STAGE: Stage = Stage::BreedingReplacement;

    fn record(&self) -> &AnimalRecord {
        &self.record
    }

    /// Daily order: promotion check, growth, program, pregnancy, then the
    /// reproductive-failure cull.
    ///
    /// Promotion happens on the day the pregnancy reaches the pre-calving
    /// window; the successor applies that day's pregnancy increment.
    fn advance(&mut self, ctx: &mut DayContext<'_>) -> Result<DayOutcome, AnimalError> {
        let growth = &ctx.params.growth;
        let day = self.record.advance_day();
        if self
            .repro
            .pregnancy
            .is_some_and(|p| p.reaches_today(growth.pre_calving_window))
        {
            self.record.suppress_day();
            return Ok(DayOutcome::promote());
        }

        self.growth.advance(&mut self.record, growth, ctx.draws)?;

        if day >= growth.breeding_start_day && self.program.is_none() {
            let mut program = HeiferProtocol::from_params(&ctx.params.heifer_breeding);
            program.start(&mut self.record, ctx)?;
            self.program = Some(program);
        }
        if let Some(program) = self.program.as_mut() {
            program.step(&mut self.record, &mut self.repro, ctx)?;
            let event = self.repro.update(
                &mut self.record,
                &ctx.params.pregnancy,
                ctx.draws,
                ctx.in_window,
            )?;
            program.after_pregnancy(event, &mut self.record, &mut self.repro, ctx)?;
        }

        if !self.repro.is_pregnant() && day > growth.repro_cull_age {
            self.record.culled = true;
            self.record.log(EventKind::Culled(CullReason::ReproductiveFailure));
            return Ok(DayOutcome::cull(CullReason::ReproductiveFailure));
        }
        Ok(DayOutcome::stay())
    }
}

// ---------------------------------------------------------------------------
// Pre-calving
// ---------------------------------------------------------------------------

/// A pregnant heifer close to calving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreCalvingHeifer {
    /// Base record.
    pub record: AnimalRecord,
    /// Body weight.
    pub growth: Growth,
    /// Insemination and pregnancy state.
    pub repro: ReproState,
}

impl From<BreedingHeifer> for PreCalvingHeifer {
    fn from(heifer: BreedingHeifer) -> Self {
        let mut record = heifer.record;
        log_promotion(&mut record, Self::STAGE);
        Self {
            record,
            growth: heifer.growth,
            repro: heifer.repro,
        }
    }
}

impl LifeStage for PreCalvingHeifer {
    const STAGE: Stage = Stage::PreCalvingReplacement;

    fn record(&self) -> &AnimalRecord {
        &self.record
    }

    /// The pregnancy advances before the entry check, so an adult entering
    /// at term calves on the same day.
    fn advance(&mut self, ctx: &mut DayContext<'_>) -> Result<DayOutcome, AnimalError> {
        let growth = &ctx.params.growth;
        if !self.repro.is_pregnant() {
            return Err(AnimalError::InvariantViolation {
                animal: self.record.id,
                context: "pre-calving heifer is not pregnant".to_owned(),
            });
        }

        self.record.advance_day();
        self.repro.advance_pregnancy();
        if self
            .repro
            .pregnancy
            .is_some_and(|p| p.within(growth.adult_entry_window))
        {
            self.record.suppress_day();
            return Ok(DayOutcome::promote());
        }
        self.growth.advance(&mut self.record, growth, ctx.draws)?;
        Ok(DayOutcome::stay())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::config::AnimalParams;
    use crate::draws::ScriptedDraws;
    use crate::pregnancy::Pregnancy;
    use herd_ledger::PriceList;
    use herd_types::{AnimalId, Breed};

    fn kept_calf() -> Calf {
        let params = AnimalParams::default();
        let mut draws = ScriptedDraws::new([0.5, 0.9, 0.2]).with_normals([40.0]);
        let mut calf =
            Calf::born(AnimalId(21), Breed::Jersey, 3, &params.calf, &mut draws).unwrap();
        calf.record.days_born = params.calf.wean_day - 1;
        calf.body_weight = Some(80.0);
        calf
    }

    #[test]
    fn promotion_carries_base_record_verbatim() {
        let calf = kept_calf();
        let before = calf.record.clone();
        let heifer = GrowingHeifer::try_from(calf).unwrap();

        assert_eq!(heifer.record.id, before.id);
        assert_eq!(heifer.record.breed, before.breed);
        assert_eq!(heifer.record.birth_day, before.birth_day);
        assert_eq!(heifer.record.days_born, before.days_born);
        assert_eq!(heifer.record.culled, before.culled);
        assert_eq!(heifer.record.do_not_breed, before.do_not_breed);
        assert_eq!(
            &heifer.record.events.entries()[..before.events.len()],
            before.events.entries()
        );
        assert_eq!(heifer.growth.body_weight, 80.0);
        assert_eq!(heifer.growth.birth_weight, 40.0);

        let breeding = BreedingHeifer::from(heifer.clone());
        assert_eq!(breeding.record.days_born, heifer.record.days_born);
        assert_eq!(breeding.growth, heifer.growth);
    }

    #[test]
    fn sold_calf_cannot_be_promoted() {
        let params = AnimalParams::default();
        let mut draws = ScriptedDraws::new([0.5, 0.1]);
        let calf = Calf::born(AnimalId(22), Breed::Holstein, 0, &params.calf, &mut draws).unwrap();
        assert!(GrowingHeifer::try_from(calf).is_err());
    }

    #[test]
    fn day_counter_is_continuous_across_promotion() {
        let params = AnimalParams::default();
        let prices = PriceList::default();
        let mut draws = ScriptedDraws::default();
        let mut ctx = DayContext {
            params: &params,
            prices: &prices,
            draws: &mut draws,
            in_window: false,
        };
        let start = params.growth.breeding_start_day - 2;
        let mut heifer = GrowingHeifer {
            record: AnimalRecord::new(AnimalId(23), Breed::Holstein, 0, start),
            growth: Growth::new(40.0, 300.0),
        };

        assert_eq!(heifer.advance(&mut ctx).unwrap(), DayOutcome::stay());
        assert!(heifer.advance(&mut ctx).unwrap().promoted());
        assert_eq!(heifer.record.days_born, start + 1);

        let mut breeding = BreedingHeifer::from(heifer);
        breeding.advance(&mut ctx).unwrap();
        assert_eq!(breeding.record.days_born, start + 2);
        assert!(breeding.program.is_some());
        breeding.advance(&mut ctx).unwrap();
        assert_eq!(breeding.record.days_born, start + 3);
    }

    #[test]
    fn open_heifer_past_cull_age_fails_reproductively() {
        let params = AnimalParams::default();
        let prices = PriceList::default();
        let mut draws = ScriptedDraws::default();
        let mut ctx = DayContext {
            params: &params,
            prices: &prices,
            draws: &mut draws,
            in_window: false,
        };
        let mut heifer = BreedingHeifer {
            record: AnimalRecord::new(AnimalId(24), Breed::Holstein, 0, params.growth.repro_cull_age),
            growth: Growth::new(40.0, 500.0),
            repro: ReproState::default(),
            program: Some(HeiferProtocol::TimedAi {
                protocol: params.heifer_breeding.tai_protocol,
                anchor: None,
            }),
        };
        let outcome = heifer.advance(&mut ctx).unwrap();
        assert_eq!(outcome.culled(), Some(CullReason::ReproductiveFailure));
        assert!(heifer.record.culled);
    }

    #[test]
    fn pre_calving_promotion_lands_on_the_threshold_day() {
        let params = AnimalParams::default();
        let prices = PriceList::default();
        let mut draws = ScriptedDraws::default();
        let mut ctx = DayContext {
            params: &params,
            prices: &prices,
            draws: &mut draws,
            in_window: false,
        };
        let window = params.growth.pre_calving_window;
        let gestation = 280;
        let mut heifer = BreedingHeifer {
            record: AnimalRecord::new(AnimalId(25), Breed::Holstein, 0, 650),
            growth: Growth::new(40.0, 600.0),
            repro: ReproState {
                ai_day: Some(400),
                pregnancy: Some(Pregnancy {
                    days: gestation - window - 1,
                    gestation,
                }),
                ..ReproState::default()
            },
            program: None,
        };
        // Day 651 takes the pregnancy to gestation - window.
        assert!(heifer.advance(&mut ctx).unwrap().promoted());
        assert_eq!(heifer.record.days_born, 650);
        assert_eq!(heifer.repro.days_pregnant(), gestation - window - 1);

        let mut pre = PreCalvingHeifer::from(heifer);
        assert_eq!(pre.advance(&mut ctx).unwrap(), DayOutcome::stay());
        assert_eq!(pre.record.days_born, 651);
        assert_eq!(pre.repro.days_pregnant(), gestation - window);
    }

    #[test]
    fn pre_calving_heifer_enters_the_herd_on_the_day_it_reaches_term() {
        let params = AnimalParams::default();
        let prices = PriceList::default();
        let mut draws = ScriptedDraws::default();
        let mut ctx = DayContext {
            params: &params,
            prices: &prices,
            draws: &mut draws,
            in_window: false,
        };
        let window = params.growth.pre_calving_window;
        let mut pre = PreCalvingHeifer {
            record: AnimalRecord::new(AnimalId(26), Breed::Holstein, 0, 651),
            growth: Growth::new(40.0, 600.0),
            repro: ReproState {
                ai_day: Some(400),
                pregnancy: Some(Pregnancy {
                    days: 280 - window,
                    gestation: 280,
                }),
                ..ReproState::default()
            },
        };
        for _ in 1..window {
            assert_eq!(pre.advance(&mut ctx).unwrap(), DayOutcome::stay());
        }
        assert_eq!(pre.repro.days_pregnant(), 279);
        assert!(pre.advance(&mut ctx).unwrap().promoted());
        assert_eq!(pre.repro.days_pregnant(), 280);
        assert_eq!(pre.record.days_born, 651 + window - 1);
    }
}
