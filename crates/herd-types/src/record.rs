//! The stage-independent base record every animal carries.

use serde::{Deserialize, Serialize};

use crate::enums::Breed;
use crate::events::{EventKind, EventLog};
use crate::ids::AnimalId;

/// Identity and status fields shared by all five life stages.
///
/// The record moves by value from one stage to the next. Nothing in it is
/// recomputed on promotion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalRecord {
    /// Unique identifier.
    pub id: AnimalId,
    /// Breed tag.
    pub breed: Breed,
    /// Simulation day on which the animal was born (or created).
    pub birth_day: u32,
    /// The animal's private clock: days since birth.
    pub days_born: u32,
    /// Removed from the herd by culling.
    pub culled: bool,
    /// No further inseminations will be attempted.
    pub do_not_breed: bool,
    /// Life event log.
    pub events: EventLog,
}

impl AnimalRecord {
    /// Create a record for an animal born on `birth_day` and already
    /// `days_born` days old.
    pub const fn new(id: AnimalId, breed: Breed, birth_day: u32, days_born: u32) -> Self {
        Self {
            id,
            breed,
            birth_day,
            days_born,
            culled: false,
            do_not_breed: false,
            events: EventLog::new(),
        }
    }

    /// Advance the private clock by one day and return the new value.
    pub const fn advance_day(&mut self) -> u32 {
        self.days_born = self.days_born.saturating_add(1);
        self.days_born
    }

    /// Take back today's increment on a promotion day so the next stage
    /// performs it.
    pub const fn suppress_day(&mut self) {
        self.days_born = self.days_born.saturating_sub(1);
    }

    /// Log an event on the current day.
    pub fn log(&mut self, kind: EventKind) {
        self.events.record(self.days_born, kind);
    }

    /// Log an event on an arbitrary day of this animal's clock.
    pub fn log_on(&mut self, day: u32, kind: EventKind) {
        self.events.record(day, kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suppressed_day_is_performed_again_by_successor() {
        let mut record = AnimalRecord::new(AnimalId(1), Breed::Holstein, 0, 59);
        assert_eq!(record.advance_day(), 60);
        record.suppress_day();
        assert_eq!(record.days_born, 59);
        assert_eq!(record.advance_day(), 60);
    }

    #[test]
    fn log_uses_current_day() {
        let mut record = AnimalRecord::new(AnimalId(2), Breed::Jersey, 5, 12);
        record.log(EventKind::BreedingStart);
        record.log_on(40, EventKind::Inseminated);
        let days: Vec<u32> = record.events.entries().iter().map(|e| e.day).collect();
        assert_eq!(days, vec![12, 40]);
    }
}
