//! Per-animal life event log.
//!
//! Each animal carries an append-only list of `(day, event)` entries keyed
//! by its own days-since-birth clock. Several entries may share a day, and
//! some are written ahead of time (a scheduled estrus is logged on the day
//! it is expected to occur).

use serde::{Deserialize, Serialize};

use crate::enums::{CullReason, Hormone, Stage};

/// Why an estrus was scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EstrusNote {
    /// First estrus after the breeding start age.
    BreedingStart,
    /// First estrus after calving.
    AfterCalving,
    /// Estrus fell inside the voluntary waiting period.
    BeforeWaitingPeriod,
    /// Next estrus after a missed detection or service.
    Repeat,
    /// Next estrus after an insemination that did not take.
    AfterInsemination,
    /// Return to estrus after a pregnancy loss or open diagnosis.
    AfterPregnancyLoss,
    /// Estrus induced by a synchronization injection.
    Synchronized,
}

impl core::fmt::Display for EstrusNote {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::BreedingStart => "first estrus after breeding start",
            Self::AfterCalving => "first estrus after calving",
            Self::BeforeWaitingPeriod => "estrus before voluntary waiting period",
            Self::Repeat => "repeat estrus",
            Self::AfterInsemination => "estrus after failed insemination",
            Self::AfterPregnancyLoss => "return to estrus after pregnancy loss",
            Self::Synchronized => "synchronized estrus",
        })
    }
}

/// Something that happened to an animal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    /// Born dead.
    Stillborn,
    /// Sold at birth.
    SoldAtBirth,
    /// Weaned; carries the wean weight in kilograms.
    Weaned {
        /// Body weight at weaning.
        weight: f64,
    },
    /// Entered a new life stage.
    Promoted(Stage),
    /// Reached breeding age.
    BreedingStart,
    /// Hit the mature weight ceiling before the growth age limit.
    MatureWeightReached {
        /// The frozen mature weight.
        weight: f64,
    },
    /// Reached the growth age limit; weight is frozen as mature weight.
    GrowthEnded {
        /// The frozen mature weight.
        weight: f64,
    },
    /// A reproduction protocol was (re)started from this day.
    ProtocolStarted(String),
    /// A hormone was administered.
    Injection(Hormone),
    /// Estrus is expected on this day.
    Estrus(EstrusNote),
    /// Estrus occurred but was not detected.
    EstrusNotDetected,
    /// Estrus was detected but the animal was not serviced.
    EstrusNotServiced,
    /// Artificial insemination.
    Inseminated,
    /// The insemination resulted in a pregnancy.
    Conceived,
    /// The insemination did not take.
    NotConceived,
    /// A scheduled pregnancy diagnosis.
    PregnancyCheck {
        /// Which check (1, 2, or 3).
        check: u8,
        /// Whether the animal was still pregnant.
        pregnant: bool,
    },
    /// Pregnancy lost at a diagnosis.
    PregnancyLoss {
        /// Which check found the loss.
        check: u8,
    },
    /// Calved; carries the new parity.
    Calved {
        /// Number of completed calvings.
        parity: u32,
    },
    /// Milking stopped ahead of calving.
    DriedOff,
    /// Flagged do-not-breed.
    DoNotBreed,
    /// A future health cull was scheduled.
    HealthCullScheduled {
        /// The reason that will be recorded.
        reason: CullReason,
        /// Days-since-birth on which the cull happens.
        day: u32,
    },
    /// Removed from the herd by culling.
    Culled(CullReason),
    /// Sold as an excess replacement.
    Sold,
    /// Bought from the replacement market.
    Purchased,
}

impl core::fmt::Display for EventKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Stillborn => f.write_str("stillborn"),
            Self::SoldAtBirth => f.write_str("sold at birth"),
            Self::Weaned { weight } => write!(f, "weaned at {weight:.1} kg"),
            Self::Promoted(stage) => write!(f, "promoted to {stage}"),
            Self::BreedingStart => f.write_str("breeding start"),
            Self::MatureWeightReached { weight } => {
                write!(f, "mature body weight {weight:.1} kg reached before growth end")
            }
            Self::GrowthEnded { weight } => write!(f, "growth ended at {weight:.1} kg"),
            Self::ProtocolStarted(name) => write!(f, "{name} started"),
            Self::Injection(hormone) => write!(f, "inject {hormone}"),
            Self::Estrus(note) => write!(f, "{note}"),
            Self::EstrusNotDetected => f.write_str("estrus not detected"),
            Self::EstrusNotServiced => f.write_str("estrus detected, not serviced"),
            Self::Inseminated => f.write_str("artificial insemination"),
            Self::Conceived => f.write_str("conceived"),
            Self::NotConceived => f.write_str("not conceived"),
            Self::PregnancyCheck { check, pregnant } => {
                let status = if *pregnant { "pregnant" } else { "open" };
                write!(f, "pregnancy check {check}: {status}")
            }
            Self::PregnancyLoss { check } => write!(f, "pregnancy loss at check {check}"),
            Self::Calved { parity } => write!(f, "calved, parity {parity}, start milking"),
            Self::DriedOff => f.write_str("dried off"),
            Self::DoNotBreed => f.write_str("do not breed"),
            Self::HealthCullScheduled { reason, day } => {
                write!(f, "health cull for {reason} scheduled on day {day}")
            }
            Self::Culled(reason) => write!(f, "culled for {reason}"),
            Self::Sold => f.write_str("sold"),
            Self::Purchased => f.write_str("purchased"),
        }
    }
}

/// A single log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifeEvent {
    /// The animal's days-since-birth when the event happened.
    pub day: u32,
    /// What happened.
    pub kind: EventKind,
}

/// Append-only event log for one animal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    entries: Vec<LifeEvent>,
}

impl EventLog {
    /// Create an empty log.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append an entry.
    pub fn record(&mut self, day: u32, kind: EventKind) {
        self.entries.push(LifeEvent { day, kind });
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> &[LifeEvent] {
        &self.entries
    }

    /// Entries recorded for a given day.
    pub fn on_day(&self, day: u32) -> impl Iterator<Item = &LifeEvent> {
        self.entries.iter().filter(move |e| e.day == day)
    }

    /// Number of entries whose kind satisfies `pred`.
    pub fn count_where(&self, pred: impl Fn(&EventKind) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.kind)).count()
    }

    /// The most recent entry, if any.
    pub fn last(&self) -> Option<&LifeEvent> {
        self.entries.last()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl core::fmt::Display for EventLog {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for entry in &self.entries {
            writeln!(f, "day {:>5}: {}", entry.day, entry.kind)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_keep_insertion_order_and_share_days() {
        let mut log = EventLog::new();
        log.record(10, EventKind::Injection(Hormone::Gnrh));
        log.record(10, EventKind::Inseminated);
        log.record(3, EventKind::BreedingStart);
        assert_eq!(log.len(), 3);
        assert_eq!(log.on_day(10).count(), 2);
        assert_eq!(log.entries().first().map(|e| e.day), Some(10));
        assert_eq!(log.last().map(|e| e.day), Some(3));
    }

    #[test]
    fn count_where_filters_by_kind() {
        let mut log = EventLog::new();
        log.record(1, EventKind::Injection(Hormone::Pgf));
        log.record(2, EventKind::Injection(Hormone::Gnrh));
        log.record(3, EventKind::Injection(Hormone::Pgf));
        let pgf = log.count_where(|k| matches!(k, EventKind::Injection(Hormone::Pgf)));
        assert_eq!(pgf, 2);
    }

    #[test]
    fn display_lists_one_line_per_entry() {
        let mut log = EventLog::new();
        log.record(60, EventKind::Weaned { weight: 81.25 });
        log.record(61, EventKind::Promoted(Stage::GrowingReplacement));
        let text = log.to_string();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("weaned at 81.2 kg") || text.contains("weaned at 81.3 kg"));
    }
}
