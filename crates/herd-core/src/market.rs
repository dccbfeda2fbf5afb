//! The replacement market: a pre-built queue of adults ready to join the herd.
//!
//! The market is stocked before the run by growing a cohort of calves
//! through every replacement stage. Each animal that reaches the adult
//! boundary is queued in the order it became ready, and the herd withdraws
//! from the front.

use std::collections::VecDeque;

use tracing::info;

use herd_animals::{Adult, Animal, AnimalError, AnimalParams, Calf, DayContext, DrawSource};
use herd_ledger::PriceList;
use herd_types::{AnimalId, Breed, IdError, IdIssuer};

use crate::config::MarketConfig;

/// Errors raised while stocking or drawing from the market.
#[derive(Debug, thiserror::Error)]
pub enum SupplyError {
    /// More replacements were needed than the market holds.
    #[error("replacement market exhausted after {withdrawn} withdrawals")]
    Exhausted {
        /// Animals withdrawn before the market ran dry.
        withdrawn: u32,
    },

    /// An animal failed while the market was being grown.
    #[error("market animal {animal} failed: {source}")]
    Animal {
        /// The failing animal.
        animal: AnimalId,
        /// The underlying error.
        source: AnimalError,
    },

    /// Identifier issuing failed.
    #[error(transparent)]
    Id(#[from] IdError),
}

/// Front-to-back queue of ready replacements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplacementMarket {
    supply: VecDeque<Adult>,
    withdrawn: u32,
}

impl ReplacementMarket {
    /// Build a market from already-prepared adults.
    pub fn from_adults(adults: impl IntoIterator<Item = Adult>) -> Self {
        Self {
            supply: adults.into_iter().collect(),
            withdrawn: 0,
        }
    }

    /// Stock the market by growing `config.size` calves for `config.days`.
    ///
    /// Calves are born on day 0 with identifiers from `issuer`, which the
    /// herd keeps using afterwards. An animal promoted on a day runs its
    /// successor stage that same day; one that becomes an adult is queued
    /// and not advanced further.
    ///
    /// # Errors
    ///
    /// Returns [`SupplyError::Animal`] if any market animal fails, or
    /// [`SupplyError::Id`] if identifiers run out.
    pub fn generate(
        config: &MarketConfig,
        breed: Breed,
        params: &AnimalParams,
        prices: &PriceList,
        issuer: &mut IdIssuer,
        draws: &mut dyn DrawSource,
    ) -> Result<Self, SupplyError> {
        let mut growing: Vec<Animal> = Vec::new();
        for _ in 0..config.size {
            let id = issuer.issue()?;
            let calf = Calf::born(id, breed, 0, &params.calf, draws)
                .map_err(|source| SupplyError::Animal { animal: id, source })?;
            if calf.is_retained() {
                growing.push(Animal::from(calf));
            }
        }

        let mut supply = VecDeque::new();
        let mut ctx = DayContext {
            params,
            prices,
            draws,
            in_window: false,
        };
        for _ in 0..config.days {
            let mut still_growing = Vec::with_capacity(growing.len());
            for animal in std::mem::take(&mut growing) {
                match grow_one_day(animal, params, &mut ctx)? {
                    Grown::Ready(adult) => supply.push_back(*adult),
                    Grown::Growing(animal) => still_growing.push(animal),
                    Grown::Culled => {}
                }
            }
            growing = still_growing;
        }

        info!(
            cohort = config.size,
            days = config.days,
            ready = supply.len(),
            unfinished = growing.len(),
            "Replacement market generated"
        );
        Ok(Self {
            supply,
            withdrawn: 0,
        })
    }

    /// Take the next replacement.
    ///
    /// # Errors
    ///
    /// Returns [`SupplyError::Exhausted`] when the queue is empty.
    pub fn withdraw(&mut self) -> Result<Adult, SupplyError> {
        let adult = self.supply.pop_front().ok_or(SupplyError::Exhausted {
            withdrawn: self.withdrawn,
        })?;
        self.withdrawn = self.withdrawn.saturating_add(1);
        Ok(adult)
    }

    /// Replacements still available.
    pub fn remaining(&self) -> usize {
        self.supply.len()
    }

    /// Replacements withdrawn so far.
    pub const fn withdrawn(&self) -> u32 {
        self.withdrawn
    }
}

enum Grown {
    Ready(Box<Adult>),
    Growing(Animal),
    Culled,
}

fn grow_one_day(
    mut animal: Animal,
    params: &AnimalParams,
    ctx: &mut DayContext<'_>,
) -> Result<Grown, SupplyError> {
    loop {
        let id = animal.record().id;
        let failed = |source| SupplyError::Animal { animal: id, source };
        let outcome = animal.advance(ctx).map_err(failed)?;
        if outcome.culled().is_some() {
            return Ok(Grown::Culled);
        }
        if !outcome.promoted() {
            return Ok(Grown::Growing(animal));
        }
        animal = animal.promote(params).map_err(failed)?;
        if let Animal::Adult(adult) = animal {
            return Ok(Grown::Ready(adult));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use herd_animals::SeededDraws;
    use herd_types::Stage;

    #[test]
    fn withdraw_is_front_to_back_and_exhausts() {
        let mut issuer = IdIssuer::new();
        let params = AnimalParams::default();
        let prices = PriceList::default();
        let mut draws = SeededDraws::new(7);
        let config = MarketConfig {
            size: 40,
            days: 900,
            open_day: 0,
        };
        let mut market = ReplacementMarket::generate(
            &config,
            Breed::Holstein,
            &params,
            &prices,
            &mut issuer,
            &mut draws,
        )
        .unwrap();

        let available = market.remaining();
        assert!(available > 0, "a 900-day cohort should produce adults");
        let mut last: Option<AnimalId> = None;
        for _ in 0..available {
            let adult = market.withdraw().unwrap();
            assert_eq!(adult.parity, 0);
            assert!(adult.repro.is_pregnant());
            assert!(adult.record.events.count_where(|k| matches!(
                k,
                herd_types::EventKind::Promoted(Stage::LactatingAdult)
            )) == 1);
            if let Some(previous) = last {
                assert_ne!(previous, adult.record.id);
            }
            last = Some(adult.record.id);
        }
        assert!(matches!(
            market.withdraw(),
            Err(SupplyError::Exhausted { withdrawn }) if withdrawn as usize == available
        ));
    }

    #[test]
    fn market_ids_come_from_the_shared_issuer() {
        let mut issuer = IdIssuer::new();
        let config = MarketConfig {
            size: 5,
            days: 1,
            open_day: 0,
        };
        let market = ReplacementMarket::generate(
            &config,
            Breed::Jersey,
            &AnimalParams::default(),
            &PriceList::default(),
            &mut issuer,
            &mut SeededDraws::new(1),
        )
        .unwrap();
        assert_eq!(market.remaining(), 0);
        assert_eq!(issuer.peek(), AnimalId(6));
    }

    #[test]
    fn empty_market_is_exhausted_immediately() {
        let mut market = ReplacementMarket::from_adults([]);
        assert!(matches!(
            market.withdraw(),
            Err(SupplyError::Exhausted { withdrawn: 0 })
        ));
    }
}
