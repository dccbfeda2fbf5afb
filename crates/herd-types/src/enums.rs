//! Closed enumerations shared across the herd simulation.
//!
//! Every enum that can appear in the parameter file carries a string tag.
//! The tag is used both for serde and for [`FromStr`](core::str::FromStr),
//! so an unrecognized breed, program, or protocol fails the same way no
//! matter where it enters the system.

use serde::{Deserialize, Serialize};

/// An unrecognized string tag for one of the closed enumerations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported {kind} tag: {tag:?}")]
pub struct UnknownTag {
    /// Which enumeration was being parsed.
    pub kind: &'static str,
    /// The tag that did not match any variant.
    pub tag: String,
}

/// Generates a tagged enum with serde renames, `Display`, and `FromStr`.
macro_rules! tagged_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $tag:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $tag)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The tag used for this variant in configuration files.
            pub const fn tag(self) -> &'static str {
                match self {
                    $(Self::$variant => $tag,)+
                }
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(self.tag())
            }
        }

        impl core::str::FromStr for $name {
            type Err = UnknownTag;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($tag => Ok(Self::$variant),)+
                    other => Err(UnknownTag {
                        kind: $kind,
                        tag: other.to_owned(),
                    }),
                }
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Animal identity
// ---------------------------------------------------------------------------

tagged_enum! {
    /// Supported dairy breeds. Breed selects birth-weight and lactation tables.
    Breed, "breed" {
        /// Holstein.
        Holstein => "HO",
        /// Jersey.
        Jersey => "JE",
    }
}

tagged_enum! {
    /// Biological sex, drawn once at birth.
    Sex, "sex" {
        /// Female calf, eligible to be kept as a replacement.
        Female => "F",
        /// Male calf, always sold.
        Male => "M",
    }
}

tagged_enum! {
    /// Semen used for inseminations, which shifts the male calf ratio.
    SemenType, "semen type" {
        /// Conventional semen.
        Conventional => "conventional",
        /// Sex-sorted semen.
        Sexed => "sexed",
    }
}

tagged_enum! {
    /// The five ordered life stages.
    Stage, "stage" {
        /// Newborn to weaning.
        Juvenile => "juvenile",
        /// Weaned, growing toward breeding age.
        GrowingReplacement => "growing_replacement",
        /// Old enough to breed; runs a replacement reproduction program.
        BreedingReplacement => "breeding_replacement",
        /// Pregnant and close to calving.
        PreCalvingReplacement => "pre_calving_replacement",
        /// Has entered the milking herd.
        LactatingAdult => "lactating_adult",
    }
}

impl Stage {
    /// The stage an animal is promoted into, if any.
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Juvenile => Some(Self::GrowingReplacement),
            Self::GrowingReplacement => Some(Self::BreedingReplacement),
            Self::BreedingReplacement => Some(Self::PreCalvingReplacement),
            Self::PreCalvingReplacement => Some(Self::LactatingAdult),
            Self::LactatingAdult => None,
        }
    }
}

tagged_enum! {
    /// Why an animal left the herd involuntarily.
    CullReason, "cull reason" {
        /// Past the do-not-breed threshold and not paying for its feed.
        LowProduction => "low_production",
        /// Feet and leg problems.
        Lameness => "lameness",
        /// Injury.
        Injury => "injury",
        /// Mastitis.
        Mastitis => "mastitis",
        /// Other disease.
        Disease => "disease",
        /// Udder conformation.
        Udder => "udder",
        /// Unrecorded reason.
        Unknown => "unknown",
        /// A replacement heifer that failed to conceive in time.
        ReproductiveFailure => "reproductive_failure",
    }
}

impl CullReason {
    /// The six health reasons, in the order their cumulative breakpoints apply.
    pub const HEALTH: [Self; 6] = [
        Self::Lameness,
        Self::Injury,
        Self::Mastitis,
        Self::Disease,
        Self::Udder,
        Self::Unknown,
    ];
}

// ---------------------------------------------------------------------------
// Reproduction
// ---------------------------------------------------------------------------

tagged_enum! {
    /// Reproductive hormones administered by protocols.
    Hormone, "hormone" {
        /// Gonadotropin-releasing hormone.
        Gnrh => "GnRH",
        /// Prostaglandin F2-alpha.
        Pgf => "PGF",
        /// Controlled internal drug release insert.
        Cidr => "CIDR",
    }
}

tagged_enum! {
    /// Reproduction program family for replacement heifers.
    HeiferProgram, "heifer program" {
        /// Estrus detection only.
        EstrusDetection => "ED",
        /// Timed artificial insemination.
        TimedAi => "TAI",
        /// Synchronized estrus followed by detection.
        SynchEstrus => "SynchED",
    }
}

tagged_enum! {
    /// Timed-insemination templates for replacement heifers.
    HeiferTaiProtocol, "heifer TAI protocol" {
        /// Five-day CO-Synch with two PGF injections.
        FiveDayCg2p => "5dCG2P",
        /// Five-day CO-Synch with one PGF injection.
        FiveDayCgp => "5dCGP",
        /// Insemination after a configured number of days.
        UserDefined => "user_defined",
    }
}

tagged_enum! {
    /// Synchronized estrus-detection templates for replacement heifers.
    SynchEstrusProtocol, "synchronized estrus protocol" {
        /// Two PGF injections fourteen days apart.
        TwoPgf => "2P",
        /// CIDR insert followed by PGF.
        CidrPgf => "CP",
    }
}

tagged_enum! {
    /// Reproduction program family for lactating adults.
    CowProgram, "cow program" {
        /// Estrus detection only.
        EstrusDetection => "ED",
        /// Timed artificial insemination.
        TimedAi => "TAI",
        /// Estrus detection until a cutoff, then timed insemination.
        EstrusThenTimedAi => "ED-TAI",
    }
}

tagged_enum! {
    /// Presynchronization templates run before the first adult TAI.
    PresynchProtocol, "presynchronization protocol" {
        /// Two PGF injections fourteen days apart.
        PreSynch => "PreSynch",
        /// An OvSynch used to set up a second OvSynch.
        DoubleOvSynch => "Double OvSynch",
        /// PGF then GnRH six days before TAI.
        G6g => "G6G",
        /// TAI starts a configured number of days after the waiting period.
        UserDefined => "user_defined",
    }
}

tagged_enum! {
    /// Timed-insemination templates for lactating adults.
    CowTaiProtocol, "cow TAI protocol" {
        /// OvSynch with insemination 56 hours after PGF.
        OvSynch56 => "OvSynch 56",
        /// OvSynch with insemination 48 hours after PGF.
        OvSynch48 => "OvSynch 48",
        /// CO-Synch with insemination at the final GnRH, 72 hours after PGF.
        CoSynch72 => "CoSynch 72",
        /// Five-day CO-Synch.
        FiveDayCoSynch => "5d CoSynch",
        /// Insemination after a configured number of days.
        UserDefined => "user_defined",
    }
}

impl CowTaiProtocol {
    /// Whether resynchronizing before diagnosis needs a preparatory GnRH.
    pub const fn needs_preparatory_gnrh(self) -> bool {
        matches!(self, Self::OvSynch56 | Self::OvSynch48 | Self::CoSynch72)
    }
}

tagged_enum! {
    /// How an adult re-enters timed insemination after an open diagnosis.
    ResynchPolicy, "resynchronization policy" {
        /// Start the TAI template the day after diagnosis.
        TaiAfterDiagnosis => "TAIafterPD",
        /// Start the TAI template six days before diagnosis.
        TaiBeforeDiagnosis => "TAIbeforePD",
        /// Inject PGF at diagnosis and start TAI eight days later.
        PgfAtDiagnosis => "PGFatPD",
    }
}

tagged_enum! {
    /// Lactation curve family used for daily milk yield.
    LactationCurve, "lactation curve" {
        /// Wood's incomplete gamma curve.
        Wood => "wood",
        /// The MilkBot curve.
        MilkBot => "milkbot",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip_through_from_str() {
        for protocol in CowTaiProtocol::ALL {
            let parsed: CowTaiProtocol = protocol.tag().parse().unwrap();
            assert_eq!(parsed, *protocol);
        }
    }

    #[test]
    fn unknown_breed_is_rejected() {
        let err = "XX".parse::<Breed>().unwrap_err();
        assert_eq!(err.kind, "breed");
        assert_eq!(err.tag, "XX");
    }

    #[test]
    fn serde_uses_the_same_tags() {
        let json = serde_json::to_string(&PresynchProtocol::DoubleOvSynch).unwrap();
        assert_eq!(json, "\"Double OvSynch\"");
        let back: ResynchPolicy = serde_json::from_str("\"PGFatPD\"").unwrap();
        assert_eq!(back, ResynchPolicy::PgfAtDiagnosis);
    }

    #[test]
    fn stages_form_a_linear_chain() {
        let mut stage = Stage::Juvenile;
        let mut steps = 0;
        while let Some(next) = stage.next() {
            stage = next;
            steps += 1;
        }
        assert_eq!(stage, Stage::LactatingAdult);
        assert_eq!(steps, 4);
    }
}
