//! The population orchestrator: one collection per stage, one tick per day.
//!
//! Each simulated day runs in a fixed order:
//!
//! 1. Calves, growing heifers, breeding heifers, and pre-calving heifers are
//!    ticked in turn. An animal promoted out of one collection joins the next
//!    before that collection is ticked, so its successor performs the day
//!    increment its predecessor suppressed.
//! 2. Pre-calving heifers beyond the near-term replacement need are sold.
//! 3. Adults short of the target herd size are bought from the market.
//! 4. Adults are ticked; culled adults are settled and removed.
//! 5. Calves born to adults today are resolved and the kept ones enqueued.
//!
//! Every collection is ticked by taking it out of the herd, advancing each
//! animal exactly once, and sorting it into stayed, promoted, or culled.
//! Nothing is removed from a collection while it is being iterated.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use herd_animals::{
    Adult, AnimalError, AnimalParams, BreedingHeifer, Calf, DayContext, DrawSource,
    GrowingHeifer, LifeStage, PreCalvingHeifer, Transition,
};
use herd_ledger::{HerdLedger, LedgerError, PriceList};
use herd_types::{AnimalId, Breed, CullReason, EventKind, IdError, IdIssuer};

use crate::clock::SimClock;
use crate::config::{RunConfig, SimulationConfig};
use crate::market::{ReplacementMarket, SupplyError};
use crate::stats::{HerdStats, ParityClass};

/// Errors that can occur during a herd tick.
#[derive(Debug, thiserror::Error)]
pub enum HerdError {
    /// An animal's daily update or promotion failed.
    #[error("animal {animal} failed on day {day}: {source}")]
    Animal {
        /// The animal that caused the error.
        animal: AnimalId,
        /// Simulation day of the failure.
        day: u32,
        /// The underlying animal error.
        source: AnimalError,
    },

    /// The replacement market could not supply an animal.
    #[error("replacement supply error: {source}")]
    Supply {
        /// The underlying supply error.
        #[from]
        source: SupplyError,
    },

    /// Herd-level money could not be recorded.
    #[error("ledger error: {source}")]
    Ledger {
        /// The underlying ledger error.
        #[from]
        source: LedgerError,
    },

    /// Identifier issuing failed.
    #[error("identifier error: {source}")]
    Id {
        /// The underlying identifier error.
        #[from]
        source: IdError,
    },
}

/// What happened during one herd tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySummary {
    /// Simulation day.
    pub day: u32,
    /// Whether the economics window was open.
    pub in_window: bool,
    /// Calves at end of day.
    pub calves: u32,
    /// Growing heifers at end of day.
    pub growing: u32,
    /// Breeding heifers at end of day.
    pub breeding: u32,
    /// Pre-calving heifers at end of day.
    pub pre_calving: u32,
    /// Adults at end of day.
    pub adults: u32,
    /// Adults milking at end of day.
    pub milking: u32,
    /// Adults and heifers culled today.
    pub culled: u32,
    /// Adults that calved today.
    pub calvings: u32,
    /// Pre-calving heifers sold today.
    pub heifers_sold: u32,
    /// Replacements bought today.
    pub bought: u32,
}

/// Herd composition at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HerdStructure {
    /// Calves before weaning.
    pub calves: u32,
    /// Growing heifers.
    pub growing: u32,
    /// Breeding heifers.
    pub breeding: u32,
    /// Pre-calving heifers.
    pub pre_calving: u32,
    /// Adults.
    pub adults: u32,
    /// Adults by parity class.
    pub adults_by_parity: BTreeMap<ParityClass, u32>,
    /// Breeding heifers currently pregnant.
    pub breeding_pregnant: u32,
    /// Adults currently pregnant.
    pub adults_pregnant: u32,
    /// Adults currently milking.
    pub adults_milking: u32,
    /// Adults still inside the voluntary waiting period.
    pub adults_in_waiting_period: u32,
}

/// Outcome of ticking one stage collection.
struct Sorted<S> {
    stayed: Vec<S>,
    promoted: Vec<S>,
    culled: Vec<(S, CullReason)>,
    births: Vec<Breed>,
}

/// Advance every animal in `animals` once and sort the results.
fn tick_stage<S: LifeStage>(
    animals: Vec<S>,
    day: u32,
    ctx: &mut DayContext<'_>,
) -> Result<Sorted<S>, HerdError> {
    let mut sorted = Sorted {
        stayed: Vec::with_capacity(animals.len()),
        promoted: Vec::new(),
        culled: Vec::new(),
        births: Vec::new(),
    };
    for mut animal in animals {
        let outcome = animal.advance(ctx).map_err(|source| HerdError::Animal {
            animal: animal.record().id,
            day,
            source,
        })?;
        if outcome.calved {
            sorted.births.push(animal.record().breed);
        }
        match outcome.transition {
            None => sorted.stayed.push(animal),
            Some(Transition::Promote) => sorted.promoted.push(animal),
            Some(Transition::Cull(reason)) => sorted.culled.push((animal, reason)),
        }
    }
    Ok(sorted)
}

fn count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

/// The whole herd, one collection per life stage.
#[derive(Debug, Clone)]
pub struct Herd {
    calves: Vec<Calf>,
    growing: Vec<GrowingHeifer>,
    breeding: Vec<BreedingHeifer>,
    pre_calving: Vec<PreCalvingHeifer>,
    adults: Vec<Adult>,
    issuer: IdIssuer,
    ledger: HerdLedger,
    stats: HerdStats,
    recent_culls: VecDeque<u32>,
    breed: Breed,
    target_adults: usize,
}

impl Herd {
    /// Create an empty herd that issues identifiers from `issuer`.
    pub fn new(run: &RunConfig, issuer: IdIssuer) -> Self {
        Self {
            calves: Vec::new(),
            growing: Vec::new(),
            breeding: Vec::new(),
            pre_calving: Vec::new(),
            adults: Vec::new(),
            issuer,
            ledger: HerdLedger::new(),
            stats: HerdStats::new(),
            recent_culls: VecDeque::new(),
            breed: run.breed,
            target_adults: usize::try_from(run.herd_size).unwrap_or(usize::MAX),
        }
    }

    /// Start the herd with `herd_size` calves born on the clock's current day.
    ///
    /// # Errors
    ///
    /// Returns [`HerdError`] if a birth fails or identifiers run out.
    pub fn populate(
        &mut self,
        clock: &SimClock,
        config: &SimulationConfig,
        draws: &mut dyn DrawSource,
    ) -> Result<(), HerdError> {
        for _ in 0..config.run.herd_size {
            self.give_birth(
                self.breed,
                clock.day(),
                clock.in_reporting_window(),
                config,
                draws,
            )?;
        }
        debug!(
            born = config.run.herd_size,
            kept = self.calves.len(),
            "Initial calf crop"
        );
        Ok(())
    }

    /// Run one simulated day.
    ///
    /// # Errors
    ///
    /// Returns [`HerdError`] for the first animal, market, or ledger failure.
    /// The herd should be discarded after an error.
    #[allow(clippy::too_many_lines)]
    pub fn tick(
        &mut self,
        clock: &SimClock,
        config: &SimulationConfig,
        market: &mut ReplacementMarket,
        draws: &mut dyn DrawSource,
    ) -> Result<DaySummary, HerdError> {
        let day = clock.day();
        let in_window = clock.in_reporting_window();
        let params = &config.animals;
        let prices = &config.economy;
        let mut summary = DaySummary {
            day,
            in_window,
            ..DaySummary::default()
        };
        let mut ctx = DayContext {
            params,
            prices,
            draws,
            in_window,
        };

        // --- Replacement stages ---
        let calves = tick_stage(std::mem::take(&mut self.calves), day, &mut ctx)?;
        self.calves = calves.stayed;
        for calf in calves.promoted {
            let id = calf.record.id;
            let heifer = GrowingHeifer::try_from(calf).map_err(|source| HerdError::Animal {
                animal: id,
                day,
                source,
            })?;
            self.growing.push(heifer);
        }

        let growing = tick_stage(std::mem::take(&mut self.growing), day, &mut ctx)?;
        self.growing = growing.stayed;
        self.breeding
            .extend(growing.promoted.into_iter().map(BreedingHeifer::from));

        let breeding = tick_stage(std::mem::take(&mut self.breeding), day, &mut ctx)?;
        self.breeding = breeding.stayed;
        for (heifer, reason) in &breeding.culled {
            trace!(animal = %heifer.record.id, %reason, day, "Heifer culled");
            self.stats.record_heifer_cull();
        }
        summary.culled = count(breeding.culled.len());
        self.pre_calving
            .extend(breeding.promoted.into_iter().map(PreCalvingHeifer::from));

        let pre_calving = tick_stage(std::mem::take(&mut self.pre_calving), day, &mut ctx)?;
        self.pre_calving = pre_calving.stayed;
        self.adults.extend(
            pre_calving
                .promoted
                .into_iter()
                .map(|heifer| Adult::from_heifer(heifer, params)),
        );

        // --- Sell excess, buy shortfall ---
        let need = self.replacement_need(day, params.growth.pre_calving_window);
        let excess = self.pre_calving.len().saturating_sub(need);
        for heifer in self.pre_calving.drain(..excess) {
            trace!(animal = %heifer.record.id, day, "Excess heifer sold");
            if in_window {
                self.ledger.record_heifer_sale(prices)?;
            }
        }
        summary.heifers_sold = count(excess);

        while self.adults.len() < self.target_adults && day > config.market.open_day {
            let mut adult = market.withdraw()?;
            adult.record.log(EventKind::Purchased);
            if in_window {
                self.ledger.record_purchase(prices)?;
            }
            self.adults.push(adult);
            summary.bought = summary.bought.saturating_add(1);
        }

        // --- Adults ---
        let adults = tick_stage(std::mem::take(&mut self.adults), day, &mut ctx)?;
        if let Some(adult) = adults.promoted.first() {
            return Err(HerdError::Animal {
                animal: adult.record.id,
                day,
                source: AnimalError::InvariantViolation {
                    animal: adult.record.id,
                    context: "an adult asked to be promoted".to_owned(),
                },
            });
        }
        if clock.in_stat_window() {
            let vwp = params.cow_breeding.voluntary_waiting_period;
            for adult in adults.stayed.iter().chain(adults.culled.iter().map(|(a, _)| a)) {
                self.stats.observe_adult(adult, vwp);
            }
            self.stats.close_day();
        }
        for (adult, reason) in &adults.culled {
            self.stats.record_adult_cull(*reason, adult.parity, in_window);
            self.recent_culls.push_back(day);
            if in_window {
                let settled = adult
                    .settle(true, true, prices)
                    .map_err(|source| HerdError::Animal {
                        animal: adult.record.id,
                        day,
                        source,
                    })?;
                self.ledger.record_summary(settled);
            }
        }
        summary.culled = summary
            .culled
            .saturating_add(count(adults.culled.len()));
        summary.calvings = count(adults.births.len());
        self.adults = adults.stayed;

        // --- Newborns ---
        for breed in adults.births {
            self.give_birth(breed, day, in_window, config, ctx.draws)?;
        }

        summary.calves = count(self.calves.len());
        summary.growing = count(self.growing.len());
        summary.breeding = count(self.breeding.len());
        summary.pre_calving = count(self.pre_calving.len());
        summary.adults = count(self.adults.len());
        summary.milking = count(self.adults.iter().filter(|a| a.milking).count());
        debug!(
            day,
            calves = summary.calves,
            growing = summary.growing,
            breeding = summary.breeding,
            pre_calving = summary.pre_calving,
            adults = summary.adults,
            culled = summary.culled,
            bought = summary.bought,
            "Day complete"
        );
        Ok(summary)
    }

    /// Record an economic summary for every adult still in the herd.
    ///
    /// # Errors
    ///
    /// Returns [`HerdError::Animal`] if an adult cannot be settled.
    pub fn settle_survivors(&mut self, day: u32, prices: &PriceList) -> Result<(), HerdError> {
        for adult in &self.adults {
            let settled = adult
                .settle(false, true, prices)
                .map_err(|source| HerdError::Animal {
                    animal: adult.record.id,
                    day,
                    source,
                })?;
            self.ledger.record_summary(settled);
        }
        Ok(())
    }

    /// Current herd composition.
    pub fn structure(&self, params: &AnimalParams) -> HerdStructure {
        let vwp = params.cow_breeding.voluntary_waiting_period;
        let mut adults_by_parity = BTreeMap::new();
        for adult in &self.adults {
            let slot = adults_by_parity
                .entry(ParityClass::of(adult.parity))
                .or_insert(0_u32);
            *slot = slot.saturating_add(1);
        }
        HerdStructure {
            calves: count(self.calves.len()),
            growing: count(self.growing.len()),
            breeding: count(self.breeding.len()),
            pre_calving: count(self.pre_calving.len()),
            adults: count(self.adults.len()),
            adults_by_parity,
            breeding_pregnant: count(
                self.breeding
                    .iter()
                    .filter(|h| h.repro.is_pregnant())
                    .count(),
            ),
            adults_pregnant: count(self.adults.iter().filter(|a| a.repro.is_pregnant()).count()),
            adults_milking: count(self.adults.iter().filter(|a| a.milking).count()),
            adults_in_waiting_period: count(
                self.adults
                    .iter()
                    .filter(|a| a.days_in_milk < vwp)
                    .count(),
            ),
        }
    }

    /// Calves before weaning.
    pub fn calves(&self) -> &[Calf] {
        &self.calves
    }

    /// Weaned heifers below breeding age.
    pub fn growing(&self) -> &[GrowingHeifer] {
        &self.growing
    }

    /// Heifers in the breeding program.
    pub fn breeding(&self) -> &[BreedingHeifer] {
        &self.breeding
    }

    /// Adults in the milking herd.
    pub fn adults(&self) -> &[Adult] {
        &self.adults
    }

    /// Pre-calving heifers.
    pub fn pre_calving(&self) -> &[PreCalvingHeifer] {
        &self.pre_calving
    }

    /// Herd-level money.
    pub const fn ledger(&self) -> &HerdLedger {
        &self.ledger
    }

    /// Rolling statistics.
    pub const fn stats(&self) -> &HerdStats {
        &self.stats
    }

    /// Adult culls in the trailing `window` days, which is how many
    /// pre-calving heifers are kept back from sale.
    fn replacement_need(&mut self, day: u32, window: u32) -> usize {
        while self
            .recent_culls
            .front()
            .is_some_and(|cull_day| day.saturating_sub(*cull_day) >= window)
        {
            self.recent_culls.pop_front();
        }
        self.recent_culls.len()
    }

    fn give_birth(
        &mut self,
        breed: Breed,
        day: u32,
        in_window: bool,
        config: &SimulationConfig,
        draws: &mut dyn DrawSource,
    ) -> Result<(), HerdError> {
        let id = self.issuer.issue()?;
        let calf = Calf::born(id, breed, day, &config.animals.calf, draws).map_err(|source| {
            HerdError::Animal {
                animal: id,
                day,
                source,
            }
        })?;
        if calf.stillborn {
            self.stats.stillbirths = self.stats.stillbirths.saturating_add(1);
        } else if calf.sold {
            self.stats.calves_sold = self.stats.calves_sold.saturating_add(1);
            if in_window {
                self.ledger.record_calf_sale(&config.economy)?;
            }
        } else {
            self.stats.calves_kept = self.stats.calves_kept.saturating_add(1);
            self.calves.push(calf);
        }
        Ok(())
    }
}
