//! Life stages, reproduction protocols, and culling for the herd simulation.
//!
//! This crate is the biology layer: everything that happens to a single
//! animal in a day, without knowing about the herd around it. It sits
//! between `herd-types` (identifiers, enums, the event log) and
//! `herd-core` (the herd, the clock, and the run loop).
//!
//! # Modules
//!
//! - [`adult`] -- The lactating adult: calving, milk, dry-off, culling ([`Adult`])
//! - [`animal`] -- The [`LifeStage`] trait and the [`Animal`] stage enum
//! - [`calf`] -- Birth outcomes and the juvenile stage ([`Calf`])
//! - [`config`] -- Biological and reproduction parameters ([`AnimalParams`])
//! - [`culling`] -- Health-cull scheduling from parity and reason tables
//! - [`day`] -- Per-day context and outcome ([`DayContext`], [`DayOutcome`])
//! - [`draws`] -- The random-draw capability ([`DrawSource`])
//! - [`error`] -- Error types for all animal operations ([`AnimalError`])
//! - [`growth`] -- Replacement body-weight growth ([`Growth`])
//! - [`heifer`] -- Growing, breeding, and pre-calving replacement heifers
//! - [`lactation`] -- Milk curves, fat, body weight, and dry-matter intake
//! - [`pregnancy`] -- Insemination outcomes and pregnancy checks ([`ReproState`])
//! - [`protocol`] -- Timed protocols, estrus detection, and program machines

pub mod adult;
pub mod animal;
pub mod calf;
pub mod config;
pub mod culling;
pub mod day;
pub mod draws;
pub mod error;
pub mod growth;
pub mod heifer;
pub mod lactation;
pub mod pregnancy;
pub mod protocol;

// Re-export primary types at crate root for convenience.
pub use adult::Adult;
pub use animal::{Animal, LifeStage};
pub use calf::Calf;
pub use config::{
    AnimalParams, CalfParams, CowBreedingParams, CullingParams, GrowthParams,
    HeiferBreedingParams, LactationParams, MilkBotParams, NormalParams, ParamError,
    PregnancyParams, PresynchChoice, WoodParams,
};
pub use culling::ScheduledCull;
pub use day::{DayContext, DayOutcome, Transition};
pub use draws::{DrawSource, ScriptedDraws, SeededDraws};
pub use error::AnimalError;
pub use growth::Growth;
pub use heifer::{BreedingHeifer, GrowingHeifer, PreCalvingHeifer};
pub use lactation::CurveShape;
pub use pregnancy::{Pregnancy, PregnancyEvent, ReproState};
pub use protocol::{CowProtocol, HeiferProtocol};
