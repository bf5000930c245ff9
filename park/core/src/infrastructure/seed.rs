// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Default Park Data
//!
//! Populates an empty store with one cage per carnivore and a shared
//! herbivore paddock. Skipped entirely when any cage already exists, so it
//! is safe to run on every startup.

use anyhow::{Context, Result};
use tracing::info;

use crate::domain::cage::{CageStatus, NewCage};
use crate::domain::repository::{CageRepository, SpeciesRepository};
use crate::domain::species::{Diet, NewSpecies, DEFAULT_QUANTITY};

const CARNIVORES: [&str; 4] = ["Tyrannosaurus", "Velociraptor", "Spinosaurus", "Megalosaurus"];
const HERBIVORES: [&str; 4] = ["Brachiosaurus", "Stegosaurus", "Ankylosaurus", "Triceratops"];

const CARNIVORE_CAGE_MAX: i64 = 4;
const HERBIVORE_CAGE_MAX: i64 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedOutcome {
    pub cages: usize,
    pub species: usize,
}

impl SeedOutcome {
    pub fn is_empty(&self) -> bool {
        self.cages == 0 && self.species == 0
    }
}

/// Insert the default cages and species unless the store already has cages
pub async fn seed_park(
    cages: &dyn CageRepository,
    species: &dyn SpeciesRepository,
) -> Result<SeedOutcome> {
    let existing = cages.count().await.context("Failed to count cages")?;
    if existing > 0 {
        info!(existing, "Store already populated, skipping seed");
        return Ok(SeedOutcome::default());
    }

    let mut outcome = SeedOutcome::default();
    let carnivore = Diet::carnivore();
    let herbivore = Diet::herbivore();

    let mut paddocks: Vec<(Vec<&str>, &Diet, i64)> = CARNIVORES
        .iter()
        .map(|name| (vec![*name], &carnivore, CARNIVORE_CAGE_MAX))
        .collect();
    paddocks.push((HERBIVORES.to_vec(), &herbivore, HERBIVORE_CAGE_MAX));

    for (names, diet, max_capacity) in paddocks {
        let occupants = names.len() as i64 * DEFAULT_QUANTITY;
        let cage = cages
            .create(&NewCage::new(occupants, max_capacity, CageStatus::Active)?)
            .await
            .context("Failed to seed cage")?;
        outcome.cages += 1;

        for name in names {
            species
                .create(&NewSpecies::new(name, diet.clone(), DEFAULT_QUANTITY, Some(cage.id))?)
                .await
                .with_context(|| format!("Failed to seed species {}", name))?;
            outcome.species += 1;
        }
    }

    info!(cages = outcome.cages, species = outcome.species, "Seeded default park data");
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repositories::{InMemoryCageRepository, InMemorySpeciesRepository};

    #[tokio::test]
    async fn test_seed_populates_empty_store() {
        let cages = InMemoryCageRepository::new();
        let species = InMemorySpeciesRepository::new();

        let outcome = seed_park(&cages, &species).await.unwrap();
        assert_eq!(outcome, SeedOutcome { cages: 5, species: 8 });

        for cage in cages.list_all().await.unwrap() {
            let sum = species.sum_quantity_by_cage(cage.id).await.unwrap();
            assert_eq!(cage.capacity, sum, "cage {} capacity out of sync", cage.id);
            assert!(cage.capacity <= cage.max_capacity);
        }

        let paddock = cages.find_by_status(CageStatus::Active).await.unwrap();
        let herbivore_cage = paddock.iter().find(|c| c.max_capacity == HERBIVORE_CAGE_MAX).unwrap();
        let herd = species.find_by_cage(herbivore_cage.id).await.unwrap();
        assert_eq!(herd.len(), 4);
        assert!(herd.iter().all(|s| s.diet == Diet::herbivore()));
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let cages = InMemoryCageRepository::new();
        let species = InMemorySpeciesRepository::new();

        seed_park(&cages, &species).await.unwrap();
        let second = seed_park(&cages, &species).await.unwrap();

        assert!(second.is_empty());
        assert_eq!(cages.count().await.unwrap(), 5);
        assert_eq!(species.list_all().await.unwrap().len(), 8);
    }
}
