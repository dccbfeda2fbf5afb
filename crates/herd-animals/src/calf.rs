//! Newborn to weaning.

use serde::{Deserialize, Serialize};

use herd_types::{AnimalId, AnimalRecord, Breed, EventKind, Sex, Stage};

use crate::animal::LifeStage;
use crate::config::CalfParams;
use crate::day::{DayContext, DayOutcome};
use crate::draws::DrawSource;
use crate::error::AnimalError;

/// A calf from birth until weaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calf {
    /// Base record.
    pub record: AnimalRecord,
    /// Drawn at birth; unset for a stillborn calf.
    pub sex: Option<Sex>,
    /// Born dead.
    pub stillborn: bool,
    /// Sold at birth.
    pub sold: bool,
    /// Only set for calves kept as replacements.
    pub birth_weight: Option<f64>,
    /// Current weight, set for kept calves.
    pub body_weight: Option<f64>,
    /// Set once on the wean day.
    pub wean_weight: Option<f64>,
}

impl Calf {
    /// Resolve a birth: stillbirth, then sex, then keep or sell, then birth
    /// weight for kept calves.
    pub fn born(
        id: AnimalId,
        breed: Breed,
        birth_day: u32,
        params: &CalfParams,
        draws: &mut dyn DrawSource,
    ) -> Result<Self, AnimalError> {
        let mut calf = Self {
            record: AnimalRecord::new(id, breed, birth_day, 0),
            sex: None,
            stillborn: false,
            sold: false,
            birth_weight: None,
            body_weight: None,
            wean_weight: None,
        };

        if draws.chance(params.stillbirth_rate)? {
            calf.stillborn = true;
            calf.record.culled = true;
            calf.record.log(EventKind::Stillborn);
            return Ok(calf);
        }

        let sex = if draws.chance(params.male_rate())? {
            Sex::Male
        } else {
            Sex::Female
        };
        calf.sex = Some(sex);
        if sex == Sex::Male || !draws.chance(params.keep_female_rate)? {
            calf.sold = true;
            calf.record.log(EventKind::SoldAtBirth);
            return Ok(calf);
        }

        let weight = draws.normal(params.birth_weight_for(breed)?)?;
        calf.birth_weight = Some(weight);
        calf.body_weight = Some(weight);
        Ok(calf)
    }

    /// Kept as a replacement: neither stillborn nor sold.
    pub const fn is_retained(&self) -> bool {
        !self.stillborn && !self.sold
    }
}

impl LifeStage for Calf {
    const STAGE: Stage = Stage::Juvenile;

    fn record(&self) -> &AnimalRecord {
        &self.record
    }

    fn advance(&mut self, ctx: &mut DayContext<'_>) -> Result<DayOutcome, AnimalError> {
        let params = &ctx.params.calf;
        let Some(weight) = self.body_weight.as_mut() else {
            return Err(AnimalError::InvariantViolation {
                animal: self.record.id,
                context: "advanced a calf that was not kept".to_owned(),
            });
        };

        let day = self.record.advance_day();
        if day == params.wean_day {
            let wean_weight = *weight;
            self.wean_weight = Some(wean_weight);
            self.record.log(EventKind::Weaned {
                weight: wean_weight,
            });
            self.record.suppress_day();
            return Ok(DayOutcome::promote());
        }

        *weight += ctx.draws.normal(&params.daily_gain)?;
        Ok(DayOutcome::stay())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::config::AnimalParams;
    use crate::draws::ScriptedDraws;
    use herd_ledger::PriceList;

    #[test]
    fn stillbirth_culls_without_weights() {
        let params = CalfParams::default();
        let mut draws = ScriptedDraws::new([0.01]);
        let calf = Calf::born(AnimalId(1), Breed::Holstein, 10, &params, &mut draws).unwrap();
        assert!(calf.stillborn);
        assert!(calf.record.culled);
        assert_eq!(calf.record.days_born, 0);
        assert_eq!(calf.birth_weight, None);
        assert_eq!(calf.sex, None);
        assert_eq!(draws.remaining_uniforms(), 0);
    }

    #[test]
    fn live_birth_draws_sex_then_sale() {
        let params = CalfParams::default();
        // Not stillborn, male.
        let mut draws = ScriptedDraws::new([0.5, 0.1]);
        let calf = Calf::born(AnimalId(2), Breed::Holstein, 0, &params, &mut draws).unwrap();
        assert_eq!(calf.sex, Some(Sex::Male));
        assert!(calf.sold);
        assert_eq!(calf.body_weight, None);

        // Not stillborn, female, kept.
        let mut draws = ScriptedDraws::new([0.5, 0.9, 0.2]).with_normals([41.0]);
        let calf = Calf::born(AnimalId(3), Breed::Holstein, 0, &params, &mut draws).unwrap();
        assert_eq!(calf.sex, Some(Sex::Female));
        assert!(calf.is_retained());
        assert_eq!(calf.birth_weight, Some(41.0));
    }

    #[test]
    fn unknown_breed_table_fails_fast() {
        let mut params = CalfParams::default();
        params.birth_weight.clear();
        let mut draws = ScriptedDraws::new([0.5, 0.9, 0.2]);
        assert!(matches!(
            Calf::born(AnimalId(4), Breed::Jersey, 0, &params, &mut draws),
            Err(AnimalError::UnsupportedDistribution { .. })
        ));
    }

    #[test]
    fn kept_female_weans_on_wean_day() {
        let params = AnimalParams::default();
        let prices = PriceList::default();
        let mut draws = ScriptedDraws::new([0.5, 0.9, 0.2]).with_normals([40.0]);
        let mut calf =
            Calf::born(AnimalId(5), Breed::Holstein, 0, &params.calf, &mut draws).unwrap();
        let mut ctx = DayContext {
            params: &params,
            prices: &prices,
            draws: &mut draws,
            in_window: false,
        };

        let wean_day = params.calf.wean_day;
        let mut weight_before_wean = 0.0;
        for day in 1..=wean_day {
            let outcome = calf.advance(&mut ctx).unwrap();
            if day < wean_day {
                assert_eq!(outcome, DayOutcome::stay());
                assert_eq!(calf.record.days_born, day);
                weight_before_wean = calf.body_weight.unwrap();
            } else {
                assert!(outcome.promoted());
            }
        }

        let wean_weight = calf.wean_weight.unwrap();
        assert!(wean_weight > 0.0);
        assert_eq!(wean_weight, weight_before_wean);
        assert_eq!(Some(wean_weight), calf.body_weight);
        let weaned: Vec<u32> = calf
            .record
            .events
            .entries()
            .iter()
            .filter(|e| matches!(e.kind, EventKind::Weaned { .. }))
            .map(|e| e.day)
            .collect();
        assert_eq!(weaned, vec![wean_day]);
        // The promotion day's increment is left to the next stage.
        assert_eq!(calf.record.days_born, wean_day - 1);
    }
}
