// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Occupancy helpers shared by the cage and species use cases.
//!
//! Callers must hold the [`CageLocks`](super::CageLocks) guard for every
//! cage passed in here.

use chrono::Utc;
use tracing::{debug, warn};

use crate::domain::cage::{Cage, CageId};
use crate::domain::capacity;
use crate::domain::diet;
use crate::domain::events::CageEvent;
use crate::domain::repository::{CageRepository, SpeciesRepository};
use crate::domain::species::Species;
use crate::domain::validation::ValidationError;
use crate::infrastructure::event_bus::EventBus;

use super::{ParkError, ParkResult};

/// How a proposed placement changes the destination cage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// The group is entering the cage from elsewhere (or from nowhere)
    pub entering: bool,
    /// The group's head count in the cage grows
    pub growing: bool,
}

impl Placement {
    pub fn adds_animals(&self) -> bool {
        self.entering || self.growing
    }
}

/// Check that `candidate`, as it will be stored, may live in `cage_id`.
///
/// Order: cage exists, cage is powered (only when animals are added),
/// diet compatibility with every other occupant, projected head count
/// fits `max_capacity`.
pub async fn check_placement(
    cages: &dyn CageRepository,
    species: &dyn SpeciesRepository,
    cage_id: CageId,
    candidate: &Species,
    placement: Placement,
) -> ParkResult<Cage> {
    let cage = cages
        .find_by_id(cage_id)
        .await?
        .ok_or(ParkError::CageNotFound(cage_id))?;

    if placement.adds_animals() && !cage.status.accepts_occupants() {
        return Err(ValidationError::CageUnavailable(cage_id).into());
    }

    let occupants = species.find_by_cage(cage_id).await?;
    diet::check_cage_occupants(&occupants, candidate)?;

    let projected = capacity::projected_occupancy(
        occupants
            .iter()
            .filter(|o| o.id != candidate.id)
            .map(|o| o.quantity)
            .chain(std::iter::once(candidate.quantity)),
        cage.max_capacity,
    )?;

    debug!(
        cage_id = %cage_id,
        species = %candidate.name,
        projected,
        max_capacity = cage.max_capacity,
        "Placement accepted"
    );
    Ok(cage)
}

/// Re-derive a cage's capacity from the quantities currently stored for it.
///
/// Returns `None` when the cage no longer exists.
pub async fn recompute_capacity(
    cages: &dyn CageRepository,
    species: &dyn SpeciesRepository,
    event_bus: &EventBus,
    cage_id: CageId,
) -> ParkResult<Option<Cage>> {
    let Some(mut cage) = cages.find_by_id(cage_id).await? else {
        warn!(cage_id = %cage_id, "Skipping capacity recompute for missing cage");
        return Ok(None);
    };

    let occupants = species.sum_quantity_by_cage(cage_id).await?;
    let previous = cage.capacity;
    if previous == occupants {
        return Ok(Some(cage));
    }

    cage.record_occupancy(occupants);
    cages.save(&cage).await?;

    debug!(cage_id = %cage_id, previous, capacity = occupants, "Cage capacity recomputed");
    event_bus.publish_cage_event(CageEvent::CageCapacityRecomputed {
        cage_id,
        previous,
        capacity: occupants,
        recomputed_at: Utc::now(),
    });

    Ok(Some(cage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cage::{CageStatus, NewCage};
    use crate::domain::species::{Diet, NewSpecies};
    use crate::infrastructure::event_bus::DomainEvent;
    use crate::infrastructure::repositories::{InMemoryCageRepository, InMemorySpeciesRepository};

    const ENTERING: Placement = Placement { entering: true, growing: false };

    async fn cage(repo: &InMemoryCageRepository, max: i64, status: CageStatus) -> Cage {
        repo.create(&NewCage::new(0, max, status).unwrap()).await.unwrap()
    }

    async fn group(
        repo: &InMemorySpeciesRepository,
        name: &str,
        diet: Diet,
        quantity: i64,
        cage_id: Option<CageId>,
    ) -> Species {
        repo.create(&NewSpecies::new(name, diet, quantity, cage_id).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_missing_cage() {
        let cages = InMemoryCageRepository::new();
        let species = InMemorySpeciesRepository::new();
        let rex = group(&species, "Tyrannosaurus", Diet::carnivore(), 1, None).await;

        let err = check_placement(&cages, &species, CageId(7), &rex, ENTERING)
            .await
            .unwrap_err();
        assert!(matches!(err, ParkError::CageNotFound(CageId(7))));
    }

    #[tokio::test]
    async fn test_down_cage_rejects_new_animals() {
        let cages = InMemoryCageRepository::new();
        let species = InMemorySpeciesRepository::new();
        let down = cage(&cages, 4, CageStatus::Down).await;
        let rex = group(&species, "Tyrannosaurus", Diet::carnivore(), 1, None).await;

        let err = check_placement(&cages, &species, down.id, &rex, ENTERING)
            .await
            .unwrap_err();
        assert_eq!(err.validation(), Some(&ValidationError::CageUnavailable(down.id)));

        // Renaming a group already inside does not add animals
        let stay = Placement { entering: false, growing: false };
        let mut inside = rex.clone();
        inside.cage_id = Some(down.id);
        assert!(check_placement(&cages, &species, down.id, &inside, stay).await.is_ok());
    }

    #[tokio::test]
    async fn test_projected_head_count_must_fit() {
        let cages = InMemoryCageRepository::new();
        let species = InMemorySpeciesRepository::new();
        let pen = cage(&cages, 4, CageStatus::Active).await;
        group(&species, "Triceratops", Diet::herbivore(), 3, Some(pen.id)).await;

        let mut stego = group(&species, "Stegosaurus", Diet::herbivore(), 2, None).await;
        let err = check_placement(&cages, &species, pen.id, &stego, ENTERING)
            .await
            .unwrap_err();
        assert_eq!(
            err.validation(),
            Some(&ValidationError::CapacityExceedsMax { capacity: 5, max_capacity: 4 })
        );

        stego.quantity = 1;
        assert!(check_placement(&cages, &species, pen.id, &stego, ENTERING).await.is_ok());
    }

    #[tokio::test]
    async fn test_head_count_past_i64_is_over_capacity() {
        let cages = InMemoryCageRepository::new();
        let species = InMemorySpeciesRepository::new();
        let pen = cage(&cages, 16, CageStatus::Active).await;
        group(&species, "Triceratops", Diet::herbivore(), 4, Some(pen.id)).await;

        let herd = group(&species, "Stegosaurus", Diet::herbivore(), i64::MAX, None).await;
        let err = check_placement(&cages, &species, pen.id, &herd, ENTERING)
            .await
            .unwrap_err();
        assert_eq!(
            err.validation(),
            Some(&ValidationError::CapacityExceedsMax { capacity: i64::MAX, max_capacity: 16 })
        );
    }

    #[tokio::test]
    async fn test_recompute_writes_sum_and_publishes() {
        let cages = InMemoryCageRepository::new();
        let species = InMemorySpeciesRepository::new();
        let bus = EventBus::new(16);
        let mut events = bus.subscribe();

        let pen = cage(&cages, 16, CageStatus::Active).await;
        group(&species, "Brachiosaurus", Diet::herbivore(), 2, Some(pen.id)).await;
        group(&species, "Ankylosaurus", Diet::herbivore(), 5, Some(pen.id)).await;

        let updated = recompute_capacity(&cages, &species, &bus, pen.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.capacity, 7);
        assert_eq!(cages.find_by_id(pen.id).await.unwrap().unwrap().capacity, 7);

        match events.drain().as_slice() {
            [DomainEvent::Cage(CageEvent::CageCapacityRecomputed { previous, capacity, .. })] => {
                assert_eq!((*previous, *capacity), (0, 7));
            }
            other => panic!("unexpected events: {:?}", other),
        }

        // Unchanged sum: no write, no event
        recompute_capacity(&cages, &species, &bus, pen.id).await.unwrap();
        assert!(events.drain().is_empty());
    }

    #[tokio::test]
    async fn test_recompute_missing_cage_is_skipped() {
        let cages = InMemoryCageRepository::new();
        let species = InMemorySpeciesRepository::new();
        let bus = EventBus::default();
        assert!(recompute_capacity(&cages, &species, &bus, CageId(3))
            .await
            .unwrap()
            .is_none());
    }
}
