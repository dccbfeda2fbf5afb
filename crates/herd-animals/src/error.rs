//! Error types for the herd-animals crate.
//!
//! Stage and protocol operations never panic. Anything that would leave an
//! animal in an inconsistent state is surfaced as an [`AnimalError`] and
//! aborts the run.

use herd_ledger::LedgerError;
use herd_types::{AnimalId, IdError, UnknownTag};

/// Errors raised while advancing or promoting an animal.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnimalError {
    /// A breed, program, or protocol has no parameters configured for it.
    #[error("unsupported distribution: no {table} parameters for {tag}")]
    UnsupportedDistribution {
        /// The parameter table that was consulted.
        table: &'static str,
        /// The tag that had no entry.
        tag: String,
    },

    /// A tag string did not name any known variant.
    #[error(transparent)]
    UnknownTag(#[from] UnknownTag),

    /// The random source produced a probability outside `[0, 1)`.
    #[error("random source produced {value}, expected a value in [0, 1)")]
    InvalidDraw {
        /// The out-of-range draw.
        value: f64,
    },

    /// A normal distribution was requested with unusable parameters.
    #[error("invalid normal distribution: mean {mean}, standard deviation {std_dev}")]
    InvalidDistribution {
        /// Requested mean.
        mean: f64,
        /// Requested standard deviation.
        std_dev: f64,
    },

    /// A bookkeeping rule was broken.
    #[error("invariant violated for animal {animal}: {context}")]
    InvariantViolation {
        /// The animal whose state is inconsistent.
        animal: AnimalId,
        /// What went wrong.
        context: String,
    },

    /// Identifier issuing failed.
    #[error(transparent)]
    Id(#[from] IdError),

    /// Economic accrual failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
