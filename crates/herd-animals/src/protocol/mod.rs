//! Reproduction protocols as day-offset schedules.
//!
//! Every timed protocol is a table of `(offset, action)` steps relative to
//! an anchor day. A single walker, [`due_steps`], yields the actions that
//! fall on today; the heifer and cow program machines decide what each
//! action means for their animal.
//!
//! # Modules
//!
//! - [`estrus`] -- Estrus scheduling and the detection/service sub-machine.
//! - [`heifer`] -- Replacement heifer programs ([`HeiferProtocol`]).
//! - [`cow`] -- Adult programs with presynchronization and resynchronization
//!   ([`CowProtocol`]).

pub mod cow;
pub mod estrus;
pub mod heifer;

use std::borrow::Cow;

use herd_types::{
    AnimalRecord, CowTaiProtocol, EventKind, HeiferTaiProtocol, Hormone, PresynchProtocol,
    SynchEstrusProtocol,
};

use crate::config::{CowBreedingParams, HeiferBreedingParams};
use crate::pregnancy::ReproState;

pub use cow::CowProtocol;
pub use heifer::HeiferProtocol;

/// What a schedule step does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAction {
    /// Administer a hormone.
    Inject(Hormone),
    /// Inseminate today at the protocol's conception rate.
    Inseminate,
    /// End presynchronization and anchor the timed-insemination schedule today.
    BeginTimedAi,
}

/// One entry in a protocol schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleStep {
    /// Days after the anchor.
    pub offset: u32,
    /// Action performed on that day.
    pub action: StepAction,
}

const fn step(offset: u32, action: StepAction) -> ScheduleStep {
    ScheduleStep { offset, action }
}

const GNRH: StepAction = StepAction::Inject(Hormone::Gnrh);
const PGF: StepAction = StepAction::Inject(Hormone::Pgf);
const CIDR: StepAction = StepAction::Inject(Hormone::Cidr);
const AI: StepAction = StepAction::Inseminate;
const BEGIN_TAI: StepAction = StepAction::BeginTimedAi;

// ---------------------------------------------------------------------------
// Schedule tables
// ---------------------------------------------------------------------------

const HEIFER_FIVE_DAY_CG2P: &[ScheduleStep] = &[
    step(0, GNRH),
    step(5, PGF),
    step(6, PGF),
    step(8, GNRH),
    step(8, AI),
];

const HEIFER_FIVE_DAY_CGP: &[ScheduleStep] = &[step(0, GNRH), step(5, PGF), step(8, GNRH), step(8, AI)];

const SYNCH_TWO_PGF: &[ScheduleStep] = &[step(0, PGF)];

const SYNCH_CIDR_PGF: &[ScheduleStep] = &[step(0, CIDR), step(7, PGF)];

const PRESYNCH: &[ScheduleStep] = &[step(0, PGF), step(14, PGF), step(26, BEGIN_TAI)];

const DOUBLE_OVSYNCH: &[ScheduleStep] = &[
    step(0, GNRH),
    step(7, PGF),
    step(10, GNRH),
    step(17, BEGIN_TAI),
];

const G6G: &[ScheduleStep] = &[step(0, PGF), step(2, GNRH), step(9, BEGIN_TAI)];

const OVSYNCH: &[ScheduleStep] = &[step(0, GNRH), step(7, PGF), step(9, GNRH), step(10, AI)];

const COSYNCH_72: &[ScheduleStep] = &[step(0, GNRH), step(7, PGF), step(10, GNRH), step(10, AI)];

const FIVE_DAY_COSYNCH: &[ScheduleStep] = &[
    step(0, GNRH),
    step(5, PGF),
    step(6, PGF),
    step(8, GNRH),
    step(8, AI),
];

/// Steps of a replacement timed-insemination template.
pub fn heifer_tai_schedule(
    protocol: HeiferTaiProtocol,
    params: &HeiferBreedingParams,
) -> Cow<'static, [ScheduleStep]> {
    match protocol {
        HeiferTaiProtocol::FiveDayCg2p => Cow::Borrowed(HEIFER_FIVE_DAY_CG2P),
        HeiferTaiProtocol::FiveDayCgp => Cow::Borrowed(HEIFER_FIVE_DAY_CGP),
        HeiferTaiProtocol::UserDefined => Cow::Owned(vec![step(params.user_defined_tai_days, AI)]),
    }
}

/// Conception rate at the end of a replacement timed-insemination template.
pub const fn heifer_tai_rate(protocol: HeiferTaiProtocol, params: &HeiferBreedingParams) -> f64 {
    match protocol {
        HeiferTaiProtocol::FiveDayCg2p => params.five_day_cg2p_conception_rate,
        HeiferTaiProtocol::FiveDayCgp => params.five_day_cgp_conception_rate,
        HeiferTaiProtocol::UserDefined => params.user_defined_conception_rate,
    }
}

/// Injection steps of a synchronized-estrus template.
pub const fn synch_schedule(protocol: SynchEstrusProtocol) -> &'static [ScheduleStep] {
    match protocol {
        SynchEstrusProtocol::TwoPgf => SYNCH_TWO_PGF,
        SynchEstrusProtocol::CidrPgf => SYNCH_CIDR_PGF,
    }
}

/// Steps of an adult presynchronization template.
pub fn presynch_schedule(
    protocol: PresynchProtocol,
    params: &CowBreedingParams,
) -> Cow<'static, [ScheduleStep]> {
    match protocol {
        PresynchProtocol::PreSynch => Cow::Borrowed(PRESYNCH),
        PresynchProtocol::DoubleOvSynch => Cow::Borrowed(DOUBLE_OVSYNCH),
        PresynchProtocol::G6g => Cow::Borrowed(G6G),
        PresynchProtocol::UserDefined => {
            Cow::Owned(vec![step(params.user_defined_presynch_days, BEGIN_TAI)])
        }
    }
}

/// Steps of an adult timed-insemination template.
pub fn cow_tai_schedule(
    protocol: CowTaiProtocol,
    params: &CowBreedingParams,
) -> Cow<'static, [ScheduleStep]> {
    match protocol {
        CowTaiProtocol::OvSynch56 | CowTaiProtocol::OvSynch48 => Cow::Borrowed(OVSYNCH),
        CowTaiProtocol::CoSynch72 => Cow::Borrowed(COSYNCH_72),
        CowTaiProtocol::FiveDayCoSynch => Cow::Borrowed(FIVE_DAY_COSYNCH),
        CowTaiProtocol::UserDefined => Cow::Owned(vec![step(params.user_defined_tai_days, AI)]),
    }
}

/// Conception rate at the end of an adult timed-insemination template.
pub const fn cow_tai_rate(protocol: CowTaiProtocol, params: &CowBreedingParams) -> f64 {
    match protocol {
        CowTaiProtocol::OvSynch56 => params.ovsynch56_conception_rate,
        CowTaiProtocol::OvSynch48 => params.ovsynch48_conception_rate,
        CowTaiProtocol::CoSynch72 => params.cosynch72_conception_rate,
        CowTaiProtocol::FiveDayCoSynch => params.five_day_cosynch_conception_rate,
        CowTaiProtocol::UserDefined => params.user_defined_conception_rate,
    }
}

// ---------------------------------------------------------------------------
// Walker
// ---------------------------------------------------------------------------

/// Actions scheduled for `today` given an anchor, in table order.
pub fn due_steps(
    steps: &[ScheduleStep],
    anchor: u32,
    today: u32,
) -> impl Iterator<Item = StepAction> + '_ {
    steps
        .iter()
        .filter(move |s| anchor.checked_add(s.offset) == Some(today))
        .map(|s| s.action)
}

/// Log an injection on `day` and count it while the window is open.
pub(crate) fn inject(
    record: &mut AnimalRecord,
    repro: &mut ReproState,
    hormone: Hormone,
    day: u32,
    in_window: bool,
) {
    record.log_on(day, EventKind::Injection(hormone));
    if in_window {
        repro.tally.record_injection(hormone);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offsets(steps: &[ScheduleStep], action: StepAction) -> Vec<u32> {
        steps
            .iter()
            .filter(|s| s.action == action)
            .map(|s| s.offset)
            .collect()
    }

    #[test]
    fn walker_only_fires_on_matching_day() {
        let fired: Vec<StepAction> = due_steps(OVSYNCH, 100, 107).collect();
        assert_eq!(fired, vec![PGF]);
        assert_eq!(due_steps(OVSYNCH, 100, 108).count(), 0);
        assert_eq!(due_steps(OVSYNCH, 100, 99).count(), 0);
    }

    #[test]
    fn cosynch_injects_and_inseminates_together() {
        let fired: Vec<StepAction> = due_steps(COSYNCH_72, 50, 60).collect();
        assert_eq!(fired, vec![GNRH, AI]);
    }

    #[test]
    fn tables_are_sorted_by_offset() {
        let params = CowBreedingParams::default();
        for protocol in CowTaiProtocol::ALL {
            let steps = cow_tai_schedule(*protocol, &params);
            assert!(steps.windows(2).all(|w| matches!(w, [a, b] if a.offset <= b.offset)));
            assert_eq!(steps.last().map(|s| s.action), Some(AI));
        }
        for protocol in PresynchProtocol::ALL {
            let steps = presynch_schedule(*protocol, &params);
            assert_eq!(steps.last().map(|s| s.action), Some(BEGIN_TAI));
        }
    }

    #[test]
    fn heifer_templates_differ_in_pgf_count() {
        let params = HeiferBreedingParams::default();
        let two = heifer_tai_schedule(HeiferTaiProtocol::FiveDayCg2p, &params);
        let one = heifer_tai_schedule(HeiferTaiProtocol::FiveDayCgp, &params);
        assert_eq!(offsets(&two, PGF), vec![5, 6]);
        assert_eq!(offsets(&one, PGF), vec![5]);
        assert_eq!(offsets(&two, AI), vec![8]);
    }

    #[test]
    fn user_defined_offsets_come_from_params() {
        let params = CowBreedingParams {
            user_defined_tai_days: 12,
            user_defined_presynch_days: 30,
            ..CowBreedingParams::default()
        };
        assert_eq!(
            offsets(&cow_tai_schedule(CowTaiProtocol::UserDefined, &params), AI),
            vec![12]
        );
        assert_eq!(
            offsets(&presynch_schedule(PresynchProtocol::UserDefined, &params), BEGIN_TAI),
            vec![30]
        );
    }
}
