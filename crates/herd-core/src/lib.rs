//! Configuration, clock, and herd orchestration for the dairy herd simulation.
//!
//! This crate owns the daily cycle that drives the herd: replacement stages
//! in order, excess heifer sales, market purchases, adults, then newborns.
//!
//! # Modules
//!
//! - [`clock`] -- Day counter with the trailing reporting and statistics
//!   windows.
//! - [`config`] -- Configuration loading from `herd-config.yaml` into
//!   strongly-typed structs.
//! - [`herd`] -- The population orchestrator and its one-day tick.
//! - [`market`] -- The pre-built queue of replacement adults.
//! - [`report`] -- End-of-run summary.
//! - [`runner`] -- The day loop with a per-day callback.
//! - [`stats`] -- Rolling reproduction and culling statistics.

pub mod clock;
pub mod config;
pub mod herd;
pub mod market;
pub mod report;
pub mod runner;
pub mod stats;
