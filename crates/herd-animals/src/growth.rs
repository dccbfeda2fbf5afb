//! Body weight growth for calves and replacement heifers.

use serde::{Deserialize, Serialize};

use herd_types::{AnimalRecord, EventKind};

use crate::config::GrowthParams;
use crate::draws::DrawSource;
use crate::error::AnimalError;

/// Body weight state carried from weaning through adulthood.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Growth {
    /// Weight at birth, in kilograms.
    pub birth_weight: f64,
    /// Current body weight, in kilograms.
    pub body_weight: f64,
    /// Frozen once growth stops, by age or by hitting the ceiling.
    pub mature_weight: Option<f64>,
}

impl Growth {
    /// Start tracking from a birth weight and the current weight.
    pub const fn new(birth_weight: f64, body_weight: f64) -> Self {
        Self {
            birth_weight,
            body_weight,
            mature_weight: None,
        }
    }

    /// Apply one day of post-weaning growth.
    ///
    /// Weight accrues a normal daily gain until the animal reaches the
    /// growth age limit or the mature weight ceiling. Whichever comes first
    /// freezes the mature weight and logs an event; after that the weight
    /// no longer changes.
    pub fn advance(
        &mut self,
        record: &mut AnimalRecord,
        params: &GrowthParams,
        draws: &mut dyn DrawSource,
    ) -> Result<(), AnimalError> {
        if self.mature_weight.is_some() {
            return Ok(());
        }
        if record.days_born >= params.growth_end_day {
            self.mature_weight = Some(self.body_weight);
            record.log(EventKind::GrowthEnded {
                weight: self.body_weight,
            });
            return Ok(());
        }

        let gain = draws.normal(&params.daily_gain)?;
        self.body_weight += gain;
        if self.body_weight >= params.mature_body_weight {
            self.body_weight = params.mature_body_weight;
            self.mature_weight = Some(self.body_weight);
            record.log(EventKind::MatureWeightReached {
                weight: self.body_weight,
            });
        }
        Ok(())
    }

    /// The mature weight used by the adult body weight formula.
    pub fn mature_or(&self, ceiling: f64) -> f64 {
        self.mature_weight.unwrap_or(ceiling)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::draws::ScriptedDraws;
    use herd_types::{AnimalId, Breed};

    fn record(days_born: u32) -> AnimalRecord {
        AnimalRecord::new(AnimalId(1), Breed::Holstein, 0, days_born)
    }

    #[test]
    fn gains_daily_until_ceiling() {
        let params = GrowthParams {
            mature_body_weight: 101.0,
            ..GrowthParams::default()
        };
        let mut growth = Growth::new(40.0, 100.0);
        let mut rec = record(200);
        let mut draws = ScriptedDraws::default().with_normals([0.5, 0.8]);

        growth.advance(&mut rec, &params, &mut draws).unwrap();
        assert_eq!(growth.body_weight, 100.5);
        assert!(growth.mature_weight.is_none());

        growth.advance(&mut rec, &params, &mut draws).unwrap();
        assert_eq!(growth.body_weight, 101.0);
        assert_eq!(growth.mature_weight, Some(101.0));
        assert!(matches!(
            rec.events.last().map(|e| &e.kind),
            Some(EventKind::MatureWeightReached { .. })
        ));

        // Frozen: no further draws consumed, no change.
        growth.advance(&mut rec, &params, &mut draws).unwrap();
        assert_eq!(growth.body_weight, 101.0);
        assert_eq!(rec.events.len(), 1);
    }

    #[test]
    fn growth_age_limit_freezes_weight() {
        let params = GrowthParams::default();
        let mut growth = Growth::new(40.0, 520.0);
        let mut rec = record(params.growth_end_day);
        let mut draws = ScriptedDraws::default();

        growth.advance(&mut rec, &params, &mut draws).unwrap();
        assert_eq!(growth.mature_weight, Some(520.0));
        assert!(matches!(
            rec.events.last().map(|e| &e.kind),
            Some(EventKind::GrowthEnded { .. })
        ));
    }

    #[test]
    fn mature_or_falls_back_to_ceiling() {
        let growth = Growth::new(40.0, 300.0);
        assert_eq!(growth.mature_or(740.0), 740.0);
    }
}
