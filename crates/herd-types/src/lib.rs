//! Shared type definitions for the dairy herd simulation.
//!
//! This crate is the leaf of the workspace: identifiers, the closed
//! enumerations that appear in configuration, the per-animal event log,
//! and the base record every life stage embeds.
//!
//! # Modules
//!
//! - [`ids`] -- [`AnimalId`] and the [`IdIssuer`] service.
//! - [`enums`] -- Breeds, stages, cull reasons, and every program and
//!   protocol selector.
//! - [`events`] -- [`EventLog`] and [`EventKind`].
//! - [`record`] -- [`AnimalRecord`], the stage-independent base.

pub mod enums;
pub mod events;
pub mod ids;
pub mod record;

pub use enums::{
    Breed, CowProgram, CowTaiProtocol, CullReason, HeiferProgram, HeiferTaiProtocol, Hormone,
    LactationCurve, PresynchProtocol, ResynchPolicy, SemenType, Sex, Stage, SynchEstrusProtocol,
    UnknownTag,
};
pub use events::{EstrusNote, EventKind, EventLog, LifeEvent};
pub use ids::{AnimalId, IdError, IdIssuer};
pub use record::AnimalRecord;
