//! Animal identifiers and the service that issues them.
//!
//! Identifiers are plain integers assigned in strictly increasing order.
//! They are handed out by an [`IdIssuer`] owned by whoever creates animals
//! (the herd, the replacement market builder) rather than by a global
//! counter, so two independent runs never share numbering state.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around `u64` with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Return the inner integer value.
            pub const fn into_inner(self) -> u64 {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for an animal, fixed at creation and never reused.
    AnimalId
}

/// Errors raised by the identifier service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// Every representable identifier has been handed out.
    #[error("animal identifier space exhausted after {last}")]
    Exhausted {
        /// The last identifier issued.
        last: u64,
    },
}

/// Issues unique, monotonically increasing [`AnimalId`] values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdIssuer {
    next: u64,
}

impl IdIssuer {
    /// Create an issuer whose first identifier is 1.
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    /// Create an issuer whose first identifier is `first`.
    pub const fn starting_at(first: u64) -> Self {
        Self { next: first }
    }

    /// Hand out the next identifier.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::Exhausted`] once `u64::MAX` has been issued.
    pub fn issue(&mut self) -> Result<AnimalId, IdError> {
        let id = AnimalId(self.next);
        self.next = self
            .next
            .checked_add(1)
            .ok_or(IdError::Exhausted { last: self.next })?;
        Ok(id)
    }

    /// The identifier the next call to [`issue`](Self::issue) will return.
    pub const fn peek(&self) -> AnimalId {
        AnimalId(self.next)
    }
}

impl Default for IdIssuer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn issues_strictly_increasing_ids() {
        let mut issuer = IdIssuer::new();
        let a = issuer.issue().unwrap();
        let b = issuer.issue().unwrap();
        let c = issuer.issue().unwrap();
        assert_eq!(a, AnimalId(1));
        assert!(a < b && b < c);
        assert_eq!(issuer.peek(), AnimalId(4));
    }

    #[test]
    fn exhaustion_is_an_error_not_a_wrap() {
        let mut issuer = IdIssuer::starting_at(u64::MAX);
        assert!(issuer.issue().is_err());
    }

    #[test]
    fn id_serializes_as_plain_integer() {
        let json = serde_json::to_string(&AnimalId(17)).unwrap();
        assert_eq!(json, "17");
    }
}
