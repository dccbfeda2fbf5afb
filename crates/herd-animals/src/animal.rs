//! The life-stage trait and the closed set of stages an animal can be in.
//!
//! Each stage is its own type. [`Animal`] wraps whichever one an animal is
//! currently in, and [`Animal::promote`] performs the copy-construct into
//! the next stage.

use herd_types::{AnimalRecord, Stage};

use crate::adult::Adult;
use crate::calf::Calf;
use crate::config::AnimalParams;
use crate::day::{DayContext, DayOutcome};
use crate::error::AnimalError;
use crate::heifer::{BreedingHeifer, GrowingHeifer, PreCalvingHeifer};

/// Behavior shared by every life stage.
pub trait LifeStage {
    /// The stage this type represents.
    const STAGE: Stage;

    /// The base record.
    fn record(&self) -> &AnimalRecord;

    /// Run one simulated day.
    ///
    /// A promotion outcome means today's clock increment was taken back and
    /// the successor must perform it.
    fn advance(&mut self, ctx: &mut DayContext<'_>) -> Result<DayOutcome, AnimalError>;
}

/// An animal in any of the five life stages.
#[derive(Debug, Clone, PartialEq)]
pub enum Animal {
    /// Newborn to weaning.
    Juvenile(Calf),
    /// Weaned, growing.
    Growing(GrowingHeifer),
    /// Running a heifer breeding program.
    Breeding(BreedingHeifer),
    /// Pregnant, close to calving.
    PreCalving(PreCalvingHeifer),
    /// In the milking herd.
    Adult(Box<Adult>),
}

impl Animal {
    /// The current stage.
    pub const fn stage(&self) -> Stage {
        match self {
            Self::Juvenile(_) => Calf::STAGE,
            Self::Growing(_) => GrowingHeifer::STAGE,
            Self::Breeding(_) => BreedingHeifer::STAGE,
            Self::PreCalving(_) => PreCalvingHeifer::STAGE,
            Self::Adult(_) => Adult::STAGE,
        }
    }

    /// The base record.
    pub fn record(&self) -> &AnimalRecord {
        match self {
            Self::Juvenile(a) => a.record(),
            Self::Growing(a) => a.record(),
            Self::Breeding(a) => a.record(),
            Self::PreCalving(a) => a.record(),
            Self::Adult(a) => a.record(),
        }
    }

    /// Run one simulated day in the current stage.
    pub fn advance(&mut self, ctx: &mut DayContext<'_>) -> Result<DayOutcome, AnimalError> {
        match self {
            Self::Juvenile(a) => a.advance(ctx),
            Self::Growing(a) => a.advance(ctx),
            Self::Breeding(a) => a.advance(ctx),
            Self::PreCalving(a) => a.advance(ctx),
            Self::Adult(a) => a.advance(ctx),
        }
    }

    /// Move into the next stage, carrying every shared field by value.
    ///
    /// # Errors
    ///
    /// Returns [`AnimalError::InvariantViolation`] for an adult, which has no
    /// successor, or for a calf that was never kept.
    pub fn promote(self, params: &AnimalParams) -> Result<Self, AnimalError> {
        let promoted = match self {
            Self::Juvenile(calf) => Self::Growing(GrowingHeifer::try_from(calf)?),
            Self::Growing(heifer) => Self::Breeding(BreedingHeifer::from(heifer)),
            Self::Breeding(heifer) => Self::PreCalving(PreCalvingHeifer::from(heifer)),
            Self::PreCalving(heifer) => Self::Adult(Box::new(Adult::from_heifer(heifer, params))),
            Self::Adult(adult) => {
                return Err(AnimalError::InvariantViolation {
                    animal: adult.record.id,
                    context: "an adult has no further stage".to_owned(),
                });
            }
        };
        tracing::debug!(
            animal = %promoted.record().id,
            stage = %promoted.stage(),
            day = promoted.record().days_born,
            "Promoted"
        );
        Ok(promoted)
    }

    /// Unwrap an adult.
    pub fn into_adult(self) -> Option<Box<Adult>> {
        match self {
            Self::Adult(adult) => Some(adult),
            _ => None,
        }
    }
}

impl From<Calf> for Animal {
    fn from(calf: Calf) -> Self {
        Self::Juvenile(calf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::draws::ScriptedDraws;
    use herd_ledger::PriceList;
    use herd_types::{AnimalId, Breed, EventKind};

    #[test]
    fn kept_calf_walks_the_stage_chain_to_adult() {
        let params = AnimalParams::default();
        let prices = PriceList::default();
        // Live, female, kept; later draws conceive and never lose a pregnancy.
        let mut draws = ScriptedDraws::new([0.5, 0.9, 0.2])
            .with_normals([40.0])
            .repeating(0.5);
        let calf = Calf::born(AnimalId(7), Breed::Holstein, 0, &params.calf, &mut draws).unwrap();
        let mut animal = Animal::from(calf);
        let mut ctx = DayContext {
            params: &params,
            prices: &prices,
            draws: &mut draws,
            in_window: false,
        };

        let mut stages = vec![animal.stage()];
        let mut ticks = 0_u32;
        for _ in 0..1_200 {
            ticks += 1;
            let outcome = animal.advance(&mut ctx).unwrap();
            assert_eq!(outcome.culled(), None);
            if outcome.promoted() {
                animal = animal.promote(&params).unwrap();
                stages.push(animal.stage());
            }
            if animal.stage() == Stage::LactatingAdult {
                break;
            }
        }

        assert_eq!(
            stages,
            vec![
                Stage::Juvenile,
                Stage::GrowingReplacement,
                Stage::BreedingReplacement,
                Stage::PreCalvingReplacement,
                Stage::LactatingAdult,
            ]
        );
        let record = animal.record();
        let promotions = record
            .events
            .count_where(|k| matches!(k, EventKind::Promoted(_)));
        assert_eq!(promotions, 4);
        // A promoted stage hands its day back; here the successor replays it
        // on the next tick instead of the same simulated day, and the final
        // adult has not ticked yet.
        assert_eq!(record.days_born, ticks - 4);
    }

    #[test]
    fn adult_cannot_be_promoted() {
        let params = AnimalParams::default();
        let heifer = PreCalvingHeifer {
            record: AnimalRecord::new(AnimalId(8), Breed::Jersey, 0, 700),
            growth: crate::growth::Growth::new(27.0, 450.0),
            repro: crate::pregnancy::ReproState::default(),
        };
        let animal = Animal::Adult(Box::new(Adult::from_heifer(heifer, &params)));
        assert_eq!(animal.stage(), Stage::LactatingAdult);
        assert!(animal.clone().into_adult().is_some());
        assert!(animal.promote(&params).is_err());
    }
}
