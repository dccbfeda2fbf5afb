//! Biological and reproduction parameters for every life stage.
//!
//! These structs mirror the `animals` section of the parameter file. Every
//! field is required when deserializing, so a missing key fails the load
//! instead of silently falling back. The [`Default`] impls carry a
//! reference Holstein/Jersey parameter set for tests and programmatic use.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use herd_types::{
    Breed, CowProgram, CowTaiProtocol, CullReason, HeiferProgram, HeiferTaiProtocol,
    LactationCurve, ResynchPolicy, SemenType, SynchEstrusProtocol,
};

use crate::error::AnimalError;

/// A parameter set failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid parameter {field}: {reason}")]
pub struct ParamError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    /// What is wrong with it.
    pub reason: String,
}

fn probability(field: &'static str, value: f64) -> Result<(), ParamError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ParamError {
            field,
            reason: format!("{value} is not a probability"),
        })
    }
}

/// Mean and standard deviation of a normal distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalParams {
    /// Mean.
    pub mean: f64,
    /// Standard deviation.
    pub std_dev: f64,
}

impl NormalParams {
    /// Create a parameter pair.
    pub const fn new(mean: f64, std_dev: f64) -> Self {
        Self { mean, std_dev }
    }

    fn validate(&self, field: &'static str) -> Result<(), ParamError> {
        if self.mean.is_finite() && self.std_dev.is_finite() && self.std_dev >= 0.0 {
            Ok(())
        } else {
            Err(ParamError {
                field,
                reason: format!("mean {} / std {} is not a usable normal", self.mean, self.std_dev),
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Top level
// ---------------------------------------------------------------------------

/// Every animal-level parameter, grouped by concern.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AnimalParams {
    /// Birth and pre-weaning.
    pub calf: CalfParams,
    /// Replacement growth and stage thresholds.
    pub growth: GrowthParams,
    /// Replacement heifer reproduction program.
    pub heifer_breeding: HeiferBreedingParams,
    /// Adult reproduction program.
    pub cow_breeding: CowBreedingParams,
    /// Gestation, pregnancy checks, and losses.
    pub pregnancy: PregnancyParams,
    /// Lactation curves and intake.
    pub lactation: LactationParams,
    /// Health and production culling.
    pub culling: CullingParams,
}

impl AnimalParams {
    /// Check ranges and cross-field consistency.
    pub fn validate(&self) -> Result<(), ParamError> {
        self.calf.validate()?;
        self.growth.validate()?;
        self.heifer_breeding.validate()?;
        self.cow_breeding.validate()?;
        self.pregnancy.validate()?;
        self.lactation.validate()?;
        self.culling.validate()?;

        if self.growth.breeding_start_day <= self.calf.wean_day {
            return Err(ParamError {
                field: "growth.breeding_start_day",
                reason: "must be after calf.wean_day".to_owned(),
            });
        }
        if self.growth.adult_entry_window >= self.growth.pre_calving_window
            && self.growth.pre_calving_window > 0
        {
            return Err(ParamError {
                field: "growth.adult_entry_window",
                reason: "must be shorter than growth.pre_calving_window".to_owned(),
            });
        }
        let min_gestation = self.pregnancy.gestation.mean - 4.0 * self.pregnancy.gestation.std_dev;
        let last_check = self.pregnancy.check_days.iter().copied().max().unwrap_or(0);
        if f64::from(last_check.saturating_add(self.growth.pre_calving_window)) >= min_gestation {
            return Err(ParamError {
                field: "pregnancy.check_days",
                reason: "last check must come before the pre-calving window opens".to_owned(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Calf
// ---------------------------------------------------------------------------

/// Birth outcome and pre-weaning growth.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CalfParams {
    /// Semen used for inseminations.
    pub semen_type: SemenType,
    /// Probability of a male calf with conventional semen.
    pub male_rate_conventional: f64,
    /// Probability of a male calf with sexed semen.
    pub male_rate_sexed: f64,
    /// Probability of a stillbirth.
    pub stillbirth_rate: f64,
    /// Fraction of live female calves kept as replacements.
    pub keep_female_rate: f64,
    /// Birth weight distribution per breed, in kilograms.
    pub birth_weight: BTreeMap<Breed, NormalParams>,
    /// Daily gain before weaning, in kilograms.
    pub daily_gain: NormalParams,
    /// Age at weaning.
    pub wean_day: u32,
}

impl CalfParams {
    /// Male calf probability for the configured semen type.
    pub const fn male_rate(&self) -> f64 {
        match self.semen_type {
            SemenType::Conventional => self.male_rate_conventional,
            SemenType::Sexed => self.male_rate_sexed,
        }
    }

    /// Birth weight distribution for `breed`.
    pub fn birth_weight_for(&self, breed: Breed) -> Result<&NormalParams, AnimalError> {
        self.birth_weight
            .get(&breed)
            .ok_or_else(|| AnimalError::UnsupportedDistribution {
                table: "birth weight",
                tag: breed.tag().to_owned(),
            })
    }

    fn validate(&self) -> Result<(), ParamError> {
        probability("calf.male_rate_conventional", self.male_rate_conventional)?;
        probability("calf.male_rate_sexed", self.male_rate_sexed)?;
        probability("calf.stillbirth_rate", self.stillbirth_rate)?;
        probability("calf.keep_female_rate", self.keep_female_rate)?;
        for params in self.birth_weight.values() {
            params.validate("calf.birth_weight")?;
        }
        self.daily_gain.validate("calf.daily_gain")?;
        if self.wean_day == 0 {
            return Err(ParamError {
                field: "calf.wean_day",
                reason: "must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}

impl Default for CalfParams {
    fn default() -> Self {
        Self {
            semen_type: SemenType::Conventional,
            male_rate_conventional: 0.53,
            male_rate_sexed: 0.10,
            stillbirth_rate: 0.065,
            keep_female_rate: 1.0,
            birth_weight: BTreeMap::from([
                (Breed::Holstein, NormalParams::new(42.0, 4.0)),
                (Breed::Jersey, NormalParams::new(27.0, 3.0)),
            ]),
            daily_gain: NormalParams::new(0.75, 0.1),
            wean_day: 60,
        }
    }
}

// ---------------------------------------------------------------------------
// Replacement growth
// ---------------------------------------------------------------------------

/// Post-weaning growth and replacement stage thresholds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GrowthParams {
    /// Daily gain after weaning, in kilograms.
    pub daily_gain: NormalParams,
    /// Age at which breeding starts.
    pub breeding_start_day: u32,
    /// Age at which growth stops and weight is frozen as mature.
    pub growth_end_day: u32,
    /// Mature weight ceiling, in kilograms.
    pub mature_body_weight: f64,
    /// Age past which an open breeding heifer is culled.
    pub repro_cull_age: u32,
    /// Days before term at which a pregnant heifer moves to pre-calving.
    pub pre_calving_window: u32,
    /// Days before term at which a pre-calving heifer joins the adults.
    pub adult_entry_window: u32,
}

impl GrowthParams {
    fn validate(&self) -> Result<(), ParamError> {
        self.daily_gain.validate("growth.daily_gain")?;
        if !(self.mature_body_weight.is_finite() && self.mature_body_weight > 0.0) {
            return Err(ParamError {
                field: "growth.mature_body_weight",
                reason: "must be positive".to_owned(),
            });
        }
        if self.repro_cull_age <= self.breeding_start_day {
            return Err(ParamError {
                field: "growth.repro_cull_age",
                reason: "must be after growth.breeding_start_day".to_owned(),
            });
        }
        Ok(())
    }
}

impl Default for GrowthParams {
    fn default() -> Self {
        Self {
            daily_gain: NormalParams::new(0.8, 0.05),
            breeding_start_day: 380,
            growth_end_day: 700,
            mature_body_weight: 740.0,
            repro_cull_age: 500,
            pre_calving_window: 21,
            adult_entry_window: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Heifer breeding
// ---------------------------------------------------------------------------

/// Replacement heifer reproduction program and its rates.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HeiferBreedingParams {
    /// Program family.
    pub program: HeiferProgram,
    /// Template used when the program is timed insemination.
    pub tai_protocol: HeiferTaiProtocol,
    /// Template used when the program is synchronized estrus.
    pub synch_protocol: SynchEstrusProtocol,
    /// Inter-estrus interval.
    pub estrus_cycle: NormalParams,
    /// Probability an estrus is detected.
    pub detection_rate: f64,
    /// Probability a detected estrus is serviced.
    pub service_rate: f64,
    /// Conception rate after a detected estrus.
    pub estrus_conception_rate: f64,
    /// Conception rate for five-day CO-Synch with two PGF.
    pub five_day_cg2p_conception_rate: f64,
    /// Conception rate for five-day CO-Synch with one PGF.
    pub five_day_cgp_conception_rate: f64,
    /// Days from anchor to insemination for the user-defined template.
    pub user_defined_tai_days: u32,
    /// Conception rate for the user-defined template.
    pub user_defined_conception_rate: f64,
    /// Estrus delay after the first synchronization PGF.
    pub synch_first_estrus: NormalParams,
    /// Cap on the first synchronized estrus delay.
    pub synch_first_estrus_max: u32,
    /// Estrus delay after the second PGF or the CIDR-PGF.
    pub synch_second_estrus: NormalParams,
    /// Cap on the second synchronized estrus delay.
    pub synch_second_estrus_max: u32,
}

impl HeiferBreedingParams {
    fn validate(&self) -> Result<(), ParamError> {
        self.estrus_cycle.validate("heifer_breeding.estrus_cycle")?;
        self.synch_first_estrus.validate("heifer_breeding.synch_first_estrus")?;
        self.synch_second_estrus.validate("heifer_breeding.synch_second_estrus")?;
        probability("heifer_breeding.detection_rate", self.detection_rate)?;
        probability("heifer_breeding.service_rate", self.service_rate)?;
        probability("heifer_breeding.estrus_conception_rate", self.estrus_conception_rate)?;
        probability(
            "heifer_breeding.five_day_cg2p_conception_rate",
            self.five_day_cg2p_conception_rate,
        )?;
        probability(
            "heifer_breeding.five_day_cgp_conception_rate",
            self.five_day_cgp_conception_rate,
        )?;
        probability(
            "heifer_breeding.user_defined_conception_rate",
            self.user_defined_conception_rate,
        )?;
        if self.synch_first_estrus_max == 0 || self.synch_second_estrus_max == 0 {
            return Err(ParamError {
                field: "heifer_breeding.synch_*_estrus_max",
                reason: "caps must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}

impl Default for HeiferBreedingParams {
    fn default() -> Self {
        Self {
            program: HeiferProgram::TimedAi,
            tai_protocol: HeiferTaiProtocol::FiveDayCg2p,
            synch_protocol: SynchEstrusProtocol::TwoPgf,
            estrus_cycle: NormalParams::new(21.0, 2.5),
            detection_rate: 0.7,
            service_rate: 0.9,
            estrus_conception_rate: 0.6,
            five_day_cg2p_conception_rate: 0.6,
            five_day_cgp_conception_rate: 0.55,
            user_defined_tai_days: 9,
            user_defined_conception_rate: 0.55,
            synch_first_estrus: NormalParams::new(5.0, 3.0),
            synch_first_estrus_max: 14,
            synch_second_estrus: NormalParams::new(3.0, 2.0),
            synch_second_estrus_max: 7,
        }
    }
}

// ---------------------------------------------------------------------------
// Cow breeding
// ---------------------------------------------------------------------------

/// Presynchronization choice for the adult TAI program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresynchChoice {
    /// No presynchronization; TAI starts at the end of the waiting period.
    #[serde(rename = "none")]
    Skip,
    /// Run the given presynchronization template first.
    #[serde(untagged)]
    Run(herd_types::PresynchProtocol),
}

/// Adult reproduction program and its rates.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CowBreedingParams {
    /// Program family.
    pub program: CowProgram,
    /// Presynchronization before the first TAI.
    pub presynch: PresynchChoice,
    /// Timed-insemination template.
    pub tai_protocol: CowTaiProtocol,
    /// Resynchronization policy after an open diagnosis.
    pub resynch_policy: ResynchPolicy,
    /// Voluntary waiting period in days in milk.
    pub voluntary_waiting_period: u32,
    /// Days in milk at which estrus-then-TAI switches to TAI.
    pub tai_cutoff_day: u32,
    /// Days in milk past which an open adult is flagged do-not-breed.
    pub do_not_breed_day: u32,
    /// Inter-estrus interval.
    pub estrus_cycle: NormalParams,
    /// Delay from calving to the first estrus.
    pub estrus_after_calving: NormalParams,
    /// Delay from a PGF injection to estrus.
    pub estrus_after_pgf: NormalParams,
    /// Probability an estrus is detected.
    pub detection_rate: f64,
    /// Probability a detected estrus is serviced.
    pub service_rate: f64,
    /// Conception rate after a detected estrus.
    pub estrus_conception_rate: f64,
    /// Conception rate for OvSynch 56.
    pub ovsynch56_conception_rate: f64,
    /// Conception rate for OvSynch 48.
    pub ovsynch48_conception_rate: f64,
    /// Conception rate for CO-Synch 72.
    pub cosynch72_conception_rate: f64,
    /// Conception rate for five-day CO-Synch.
    pub five_day_cosynch_conception_rate: f64,
    /// Days from anchor to insemination for the user-defined TAI template.
    pub user_defined_tai_days: u32,
    /// Conception rate for the user-defined TAI template.
    pub user_defined_conception_rate: f64,
    /// Days from the waiting period to TAI for user-defined presynchronization.
    pub user_defined_presynch_days: u32,
}

impl CowBreedingParams {
    fn validate(&self) -> Result<(), ParamError> {
        self.estrus_cycle.validate("cow_breeding.estrus_cycle")?;
        self.estrus_after_calving.validate("cow_breeding.estrus_after_calving")?;
        self.estrus_after_pgf.validate("cow_breeding.estrus_after_pgf")?;
        probability("cow_breeding.detection_rate", self.detection_rate)?;
        probability("cow_breeding.service_rate", self.service_rate)?;
        probability("cow_breeding.estrus_conception_rate", self.estrus_conception_rate)?;
        probability("cow_breeding.ovsynch56_conception_rate", self.ovsynch56_conception_rate)?;
        probability("cow_breeding.ovsynch48_conception_rate", self.ovsynch48_conception_rate)?;
        probability("cow_breeding.cosynch72_conception_rate", self.cosynch72_conception_rate)?;
        probability(
            "cow_breeding.five_day_cosynch_conception_rate",
            self.five_day_cosynch_conception_rate,
        )?;
        probability(
            "cow_breeding.user_defined_conception_rate",
            self.user_defined_conception_rate,
        )?;
        if self.program == CowProgram::EstrusThenTimedAi
            && self.tai_cutoff_day <= self.voluntary_waiting_period
        {
            return Err(ParamError {
                field: "cow_breeding.tai_cutoff_day",
                reason: "must be after the voluntary waiting period".to_owned(),
            });
        }
        if self.do_not_breed_day <= self.voluntary_waiting_period {
            return Err(ParamError {
                field: "cow_breeding.do_not_breed_day",
                reason: "must be after the voluntary waiting period".to_owned(),
            });
        }
        Ok(())
    }
}

impl Default for CowBreedingParams {
    fn default() -> Self {
        Self {
            program: CowProgram::TimedAi,
            presynch: PresynchChoice::Run(herd_types::PresynchProtocol::PreSynch),
            tai_protocol: CowTaiProtocol::OvSynch56,
            resynch_policy: ResynchPolicy::TaiAfterDiagnosis,
            voluntary_waiting_period: 50,
            tai_cutoff_day: 75,
            do_not_breed_day: 185,
            estrus_cycle: NormalParams::new(21.0, 4.0),
            estrus_after_calving: NormalParams::new(35.0, 7.0),
            estrus_after_pgf: NormalParams::new(5.0, 2.0),
            detection_rate: 0.6,
            service_rate: 0.9,
            estrus_conception_rate: 0.3,
            ovsynch56_conception_rate: 0.39,
            ovsynch48_conception_rate: 0.35,
            cosynch72_conception_rate: 0.32,
            five_day_cosynch_conception_rate: 0.37,
            user_defined_tai_days: 10,
            user_defined_conception_rate: 0.33,
            user_defined_presynch_days: 20,
        }
    }
}

// ---------------------------------------------------------------------------
// Pregnancy
// ---------------------------------------------------------------------------

/// Gestation, diagnosis schedule, and loss risk.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PregnancyParams {
    /// Gestation length distribution, in days.
    pub gestation: NormalParams,
    /// Days after insemination of the three pregnancy checks.
    pub check_days: [u32; 3],
    /// Loss probability evaluated at each check.
    pub loss_rates: [f64; 3],
    /// Conception rate reduction applied to the next insemination after a
    /// pregnancy loss or resynchronization.
    pub conception_penalty: f64,
}

impl PregnancyParams {
    fn validate(&self) -> Result<(), ParamError> {
        self.gestation.validate("pregnancy.gestation")?;
        if self.gestation.mean <= 0.0 {
            return Err(ParamError {
                field: "pregnancy.gestation",
                reason: "mean must be positive".to_owned(),
            });
        }
        if !self.check_days.windows(2).all(|w| matches!(w, [a, b] if a < b)) {
            return Err(ParamError {
                field: "pregnancy.check_days",
                reason: "checks must be strictly increasing".to_owned(),
            });
        }
        if self.check_days.first().is_some_and(|d| *d == 0) {
            return Err(ParamError {
                field: "pregnancy.check_days",
                reason: "first check must be after insemination".to_owned(),
            });
        }
        for rate in self.loss_rates {
            probability("pregnancy.loss_rates", rate)?;
        }
        probability("pregnancy.conception_penalty", self.conception_penalty)
    }
}

impl Default for PregnancyParams {
    fn default() -> Self {
        Self {
            gestation: NormalParams::new(276.0, 6.0),
            check_days: [32, 60, 200],
            loss_rates: [0.02, 0.096, 0.017],
            conception_penalty: 0.026,
        }
    }
}

// ---------------------------------------------------------------------------
// Lactation
// ---------------------------------------------------------------------------

/// Wood curve shape parameters for one breed and parity bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WoodParams {
    /// Scale.
    pub l: NormalParams,
    /// Rate of increase to peak.
    pub m: NormalParams,
    /// Rate of decline after peak.
    pub n: NormalParams,
}

/// MilkBot curve shape parameters for one breed and parity bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MilkBotParams {
    /// Scale.
    pub a: NormalParams,
    /// Ramp.
    pub b: NormalParams,
    /// Offset.
    pub c: NormalParams,
    /// Decay.
    pub d: NormalParams,
}

/// Lactation curves, dry-off, and dry-period intake.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LactationParams {
    /// Curve family.
    pub curve: LactationCurve,
    /// Length of the dry period before calving.
    pub dry_period: u32,
    /// Dry-matter intake while not milking, in kilograms.
    pub dry_matter_intake_dry: f64,
    /// Wood parameters per breed for parities 1, 2, and 3+.
    pub wood: BTreeMap<Breed, [WoodParams; 3]>,
    /// MilkBot parameters per breed for parities 1, 2, and 3+.
    pub milkbot: BTreeMap<Breed, [MilkBotParams; 3]>,
}

impl LactationParams {
    fn validate(&self) -> Result<(), ParamError> {
        for table in self.wood.values() {
            for p in table {
                p.l.validate("lactation.wood.l")?;
                p.m.validate("lactation.wood.m")?;
                p.n.validate("lactation.wood.n")?;
            }
        }
        for table in self.milkbot.values() {
            for p in table {
                p.a.validate("lactation.milkbot.a")?;
                p.b.validate("lactation.milkbot.b")?;
                p.c.validate("lactation.milkbot.c")?;
                p.d.validate("lactation.milkbot.d")?;
            }
        }
        if !(self.dry_matter_intake_dry.is_finite() && self.dry_matter_intake_dry >= 0.0) {
            return Err(ParamError {
                field: "lactation.dry_matter_intake_dry",
                reason: "must be a non-negative number".to_owned(),
            });
        }
        Ok(())
    }
}

const fn wood(l: (f64, f64), m: (f64, f64), n: (f64, f64)) -> WoodParams {
    WoodParams {
        l: NormalParams::new(l.0, l.1),
        m: NormalParams::new(m.0, m.1),
        n: NormalParams::new(n.0, n.1),
    }
}

const fn milkbot(a: (f64, f64), b: (f64, f64), c: (f64, f64), d: (f64, f64)) -> MilkBotParams {
    MilkBotParams {
        a: NormalParams::new(a.0, a.1),
        b: NormalParams::new(b.0, b.1),
        c: NormalParams::new(c.0, c.1),
        d: NormalParams::new(d.0, d.1),
    }
}

impl Default for LactationParams {
    fn default() -> Self {
        Self {
            curve: LactationCurve::Wood,
            dry_period: 60,
            dry_matter_intake_dry: 12.0,
            wood: BTreeMap::from([
                (
                    Breed::Holstein,
                    [
                        wood((19.9, 2.0), (0.247, 0.02), (0.0030, 0.0003)),
                        wood((28.8, 3.0), (0.194, 0.02), (0.0044, 0.0004)),
                        wood((32.0, 3.0), (0.190, 0.02), (0.0048, 0.0004)),
                    ],
                ),
                (
                    Breed::Jersey,
                    [
                        wood((14.3, 1.5), (0.247, 0.02), (0.0030, 0.0003)),
                        wood((20.7, 2.2), (0.194, 0.02), (0.0044, 0.0004)),
                        wood((23.0, 2.2), (0.190, 0.02), (0.0048, 0.0004)),
                    ],
                ),
            ]),
            milkbot: BTreeMap::from([
                (
                    Breed::Holstein,
                    [
                        milkbot((38.0, 4.0), (28.0, 3.0), (0.5, 0.1), (0.0012, 0.0002)),
                        milkbot((48.0, 4.0), (22.0, 3.0), (0.5, 0.1), (0.0022, 0.0002)),
                        milkbot((52.0, 4.0), (21.0, 3.0), (0.5, 0.1), (0.0026, 0.0002)),
                    ],
                ),
                (
                    Breed::Jersey,
                    [
                        milkbot((27.0, 3.0), (28.0, 3.0), (0.5, 0.1), (0.0012, 0.0002)),
                        milkbot((34.5, 3.0), (22.0, 3.0), (0.5, 0.1), (0.0022, 0.0002)),
                        milkbot((37.5, 3.0), (21.0, 3.0), (0.5, 0.1), (0.0026, 0.0002)),
                    ],
                ),
            ]),
        }
    }
}

// ---------------------------------------------------------------------------
// Culling
// ---------------------------------------------------------------------------

/// Health-cull risk and low-production culling.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CullingParams {
    /// Probability of scheduling a health cull at calving, for parities
    /// 1, 2, 3, and 4+.
    pub parity_cull_probability: [f64; 4],
    /// Cumulative probability breakpoints selecting the health reason, in
    /// the order of [`CullReason::HEALTH`].
    pub reason_breakpoints: [f64; 6],
    /// Day offsets matching each reason's cumulative probabilities.
    pub cull_day_offsets: Vec<u32>,
    /// Cumulative probability breakpoints per health reason.
    pub reason_cdfs: BTreeMap<CullReason, Vec<f64>>,
    /// Days in milk past which a do-not-breed adult can be culled for low
    /// production.
    pub low_production_min_days_in_milk: u32,
}

impl CullingParams {
    /// Cumulative breakpoints for a health reason.
    pub fn cdf_for(&self, reason: CullReason) -> Result<&[f64], AnimalError> {
        self.reason_cdfs
            .get(&reason)
            .map(Vec::as_slice)
            .ok_or_else(|| AnimalError::UnsupportedDistribution {
                table: "cull day",
                tag: reason.tag().to_owned(),
            })
    }

    fn validate(&self) -> Result<(), ParamError> {
        for p in self.parity_cull_probability {
            probability("culling.parity_cull_probability", p)?;
        }
        let nondecreasing = |values: &[f64]| values.windows(2).all(|w| matches!(w, [a, b] if a <= b));
        if !nondecreasing(&self.reason_breakpoints)
            || self.reason_breakpoints.last().is_none_or(|last| *last < 1.0)
        {
            return Err(ParamError {
                field: "culling.reason_breakpoints",
                reason: "must be non-decreasing and end at 1".to_owned(),
            });
        }
        if !self.cull_day_offsets.windows(2).all(|w| matches!(w, [a, b] if a <= b)) {
            return Err(ParamError {
                field: "culling.cull_day_offsets",
                reason: "must be non-decreasing".to_owned(),
            });
        }
        for reason in CullReason::HEALTH {
            let cdf = self.reason_cdfs.get(&reason).ok_or_else(|| ParamError {
                field: "culling.reason_cdfs",
                reason: format!("missing breakpoints for {reason}"),
            })?;
            if cdf.len() != self.cull_day_offsets.len() || cdf.len() < 2 {
                return Err(ParamError {
                    field: "culling.reason_cdfs",
                    reason: format!("{reason} must have one breakpoint per day offset"),
                });
            }
            let starts_at_zero = cdf.first().is_some_and(|v| *v <= 0.0);
            let ends_at_one = cdf.last().is_some_and(|v| *v >= 1.0);
            if !(nondecreasing(cdf) && starts_at_zero && ends_at_one) {
                return Err(ParamError {
                    field: "culling.reason_cdfs",
                    reason: format!("{reason} must rise from 0 to 1"),
                });
            }
        }
        Ok(())
    }
}

impl Default for CullingParams {
    fn default() -> Self {
        Self {
            parity_cull_probability: [0.169, 0.233, 0.301, 0.408],
            reason_breakpoints: [0.1633, 0.4516, 0.6955, 0.8346, 0.8991, 1.0],
            cull_day_offsets: vec![0, 5, 15, 45, 90, 135, 180, 225, 270, 330, 380, 430, 480, 530],
            reason_cdfs: BTreeMap::from([
                (
                    CullReason::Lameness,
                    vec![0.0, 0.03, 0.08, 0.16, 0.25, 0.36, 0.48, 0.59, 0.69, 0.79, 0.87, 0.93, 0.97, 1.0],
                ),
                (
                    CullReason::Injury,
                    vec![0.0, 0.08, 0.18, 0.30, 0.41, 0.51, 0.60, 0.68, 0.75, 0.82, 0.88, 0.93, 0.97, 1.0],
                ),
                (
                    CullReason::Mastitis,
                    vec![0.0, 0.10, 0.22, 0.34, 0.45, 0.55, 0.64, 0.72, 0.79, 0.85, 0.90, 0.94, 0.97, 1.0],
                ),
                (
                    CullReason::Disease,
                    vec![0.0, 0.12, 0.25, 0.37, 0.48, 0.57, 0.65, 0.72, 0.78, 0.84, 0.89, 0.93, 0.97, 1.0],
                ),
                (
                    CullReason::Udder,
                    vec![0.0, 0.04, 0.10, 0.18, 0.27, 0.37, 0.47, 0.57, 0.66, 0.75, 0.83, 0.90, 0.96, 1.0],
                ),
                (
                    CullReason::Unknown,
                    vec![0.0, 0.06, 0.14, 0.24, 0.34, 0.44, 0.53, 0.62, 0.70, 0.78, 0.85, 0.91, 0.96, 1.0],
                ),
            ]),
            low_production_min_days_in_milk: 80,
        }
    }
}
