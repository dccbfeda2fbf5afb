//! Lactation curves and the fixed empirical formulas for adults.
//!
//! The curve shape is sampled once per lactation from breed and parity
//! tables, then evaluated daily against days in milk. Fat, fat-corrected
//! milk, body weight, and intake are closed-form approximations.

use serde::{Deserialize, Serialize};

use herd_types::{Breed, LactationCurve};

use crate::config::LactationParams;
use crate::draws::DrawSource;
use crate::error::AnimalError;

/// Body weight recovery and loss coefficients for first-lactation adults.
const FIRST_PARITY_BODY: BodyCoefficients = BodyCoefficients {
    rate: 0.0039,
    loss: 20.0,
    loss_peak: 65.0,
};

/// Coefficients for every later lactation.
const LATER_PARITY_BODY: BodyCoefficients = BodyCoefficients {
    rate: 0.006,
    loss: 40.0,
    loss_peak: 75.0,
};

/// Pregnancy weight term coefficient.
const CONCEPTUS_GAIN: f64 = 0.0187;

/// Days of gestation before the conceptus adds measurable weight.
const CONCEPTUS_LAG: f64 = 50.0;

#[derive(Debug, Clone, Copy)]
struct BodyCoefficients {
    rate: f64,
    loss: f64,
    loss_peak: f64,
}

/// Per-lactation curve shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CurveShape {
    /// `l * t^m * e^(-n t)`.
    Wood {
        /// Scale.
        l: f64,
        /// Rate of increase.
        m: f64,
        /// Rate of decline.
        n: f64,
    },
    /// `a * (1 - e^((c - t) / b) / 2) * e^(-d t)`.
    MilkBot {
        /// Scale.
        a: f64,
        /// Ramp.
        b: f64,
        /// Offset.
        c: f64,
        /// Decay.
        d: f64,
    },
}

impl CurveShape {
    /// Draw the shape for a new lactation.
    pub fn sample(
        params: &LactationParams,
        breed: Breed,
        parity: u32,
        draws: &mut dyn DrawSource,
    ) -> Result<Self, AnimalError> {
        let bucket = parity_bucket(parity);
        match params.curve {
            LactationCurve::Wood => {
                let shape = params
                    .wood
                    .get(&breed)
                    .and_then(|table| table.get(bucket))
                    .ok_or_else(|| unsupported("Wood curve", breed))?;
                Ok(Self::Wood {
                    l: draws.normal(&shape.l)?,
                    m: draws.normal(&shape.m)?,
                    n: draws.normal(&shape.n)?,
                })
            }
            LactationCurve::MilkBot => {
                let shape = params
                    .milkbot
                    .get(&breed)
                    .and_then(|table| table.get(bucket))
                    .ok_or_else(|| unsupported("MilkBot curve", breed))?;
                Ok(Self::MilkBot {
                    a: draws.normal(&shape.a)?,
                    b: draws.normal(&shape.b)?,
                    c: draws.normal(&shape.c)?,
                    d: draws.normal(&shape.d)?,
                })
            }
        }
    }

    /// Daily yield in kilograms at `days_in_milk`, never negative.
    pub fn daily_yield(&self, days_in_milk: u32) -> f64 {
        let t = f64::from(days_in_milk);
        let value = match *self {
            Self::Wood { l, m, n } => l * t.powf(m) * (-n * t).exp(),
            Self::MilkBot { a, b, c, d } => {
                a * (1.0 - ((c - t) / b).exp() / 2.0) * (-d * t).exp()
            }
        };
        if value.is_finite() { value.max(0.0) } else { 0.0 }
    }
}

fn unsupported(table: &'static str, breed: Breed) -> AnimalError {
    AnimalError::UnsupportedDistribution {
        table,
        tag: breed.tag().to_owned(),
    }
}

/// Table row for parity 1, 2, or 3 and later.
const fn parity_bucket(parity: u32) -> usize {
    match parity {
        0 | 1 => 0,
        2 => 1,
        _ => 2,
    }
}

/// Milk fat percentage at `days_in_milk`.
pub fn fat_percent(days_in_milk: u32) -> f64 {
    let t = f64::from(days_in_milk);
    if t < 1.0 {
        return 0.0;
    }
    let ln_t = t.ln();
    12.86 * t.powf(-1.081) * (0.0926 * ln_t * ln_t).exp() * ln_t.powf(1.107)
}

/// Fat-corrected milk from yield and fat percentage.
pub fn fat_corrected_milk(milk_yield: f64, fat_percent: f64) -> f64 {
    0.4 * milk_yield + 0.15 * fat_percent * milk_yield
}

/// Inputs to the adult body weight formula.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyWeightInputs {
    /// Mature weight asymptote, in kilograms.
    pub mature_weight: f64,
    /// Weight at birth, in kilograms.
    pub birth_weight: f64,
    /// Age in days.
    pub age: u32,
    /// Completed calvings.
    pub parity: u32,
    /// Days in milk.
    pub days_in_milk: u32,
    /// Days pregnant, zero when open.
    pub days_pregnant: u32,
}

/// Adult body weight: a growth curve toward mature weight, minus early
/// lactation mobilization, plus conceptus weight.
pub fn adult_body_weight(inputs: &BodyWeightInputs) -> f64 {
    let coef = if inputs.parity <= 1 {
        FIRST_PARITY_BODY
    } else {
        LATER_PARITY_BODY
    };
    let mature = inputs.mature_weight;
    let age = f64::from(inputs.age);
    let dim = f64::from(inputs.days_in_milk);

    let start = (inputs.birth_weight / mature).cbrt();
    let growth = mature * (1.0 - (1.0 - start) * (-coef.rate * age).exp()).powi(3);
    let mobilized = (coef.loss / coef.loss_peak) * dim * (1.0 - dim / coef.loss_peak).exp();
    let conceptus = if inputs.days_pregnant == 0 {
        0.0
    } else {
        (CONCEPTUS_GAIN * (f64::from(inputs.days_pregnant) - CONCEPTUS_LAG)).powi(3)
    };
    growth - mobilized + conceptus
}

/// Dry-matter intake while milking.
pub fn dry_matter_intake(fat_corrected_milk: f64, body_weight: f64, days_in_milk: u32) -> f64 {
    let week = f64::from(days_in_milk) / 7.0;
    0.372 * fat_corrected_milk
        + 0.0968 * body_weight.max(0.0).powf(0.75) * (1.0 - (-0.192 * (week + 3.67)).exp())
}
