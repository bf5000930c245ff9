// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Cage Service
//!
//! Create, read, update and delete cages.
//!
//! # Architecture
//!
//! - **Layer:** Application
//! - **Collaborators:** CageRepository, SpeciesRepository, CageLocks, EventBus
//!
//! Updates and deletes hold the cage lock so they cannot interleave with a
//! relocation that is recomputing the same cage's capacity.

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::domain::cage::{Cage, CageId, CageStatus, CageWithSpecies, NewCage, DEFAULT_MAX_CAPACITY};
use crate::domain::capacity;
use crate::domain::diet;
use crate::domain::events::{CageEvent, SpeciesEvent};
use crate::domain::repository::{CageRepository, SpeciesRepository};
use crate::domain::species::{Diet, NewSpecies, Species, DEFAULT_QUANTITY};
use crate::domain::validation::ValidationError;
use crate::infrastructure::event_bus::EventBus;

use super::cage_locks::CageLocks;
use super::occupancy;
use super::{ParkError, ParkResult};

/// Body of `POST /cages`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCageRequest {
    #[serde(default)]
    pub capacity: Option<i64>,
    #[serde(default)]
    pub max_capacity: Option<i64>,
    pub status: CageStatus,
    /// Groups to house in the new cage
    #[serde(default)]
    pub species: Vec<CageSpeciesInput>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CageSpeciesInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub diet: Option<Diet>,
    #[serde(default)]
    pub quantity: Option<i64>,
}

/// Body of `PATCH /cage/{id}`; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCageRequest {
    #[serde(default)]
    pub capacity: Option<i64>,
    #[serde(default)]
    pub max_capacity: Option<i64>,
    #[serde(default)]
    pub status: Option<CageStatus>,
}

#[async_trait]
pub trait CageService: Send + Sync {
    async fn create_cage(&self, request: CreateCageRequest) -> ParkResult<CageWithSpecies>;

    /// Cage detail, including the species it houses
    async fn get_cage(&self, id: CageId) -> ParkResult<CageWithSpecies>;

    async fn list_cages(&self) -> ParkResult<Vec<Cage>>;

    async fn list_cages_by_status(&self, status: CageStatus) -> ParkResult<Vec<Cage>>;

    async fn update_cage(&self, id: CageId, request: UpdateCageRequest) -> ParkResult<Cage>;

    /// Delete a cage. Its occupants stay in the park, unassigned.
    async fn delete_cage(&self, id: CageId) -> ParkResult<()>;
}

pub struct StandardCageService {
    cage_repository: Arc<dyn CageRepository>,
    species_repository: Arc<dyn SpeciesRepository>,
    cage_locks: CageLocks,
    event_bus: Arc<EventBus>,
}

impl StandardCageService {
    pub fn new(
        cage_repository: Arc<dyn CageRepository>,
        species_repository: Arc<dyn SpeciesRepository>,
        cage_locks: CageLocks,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            cage_repository,
            species_repository,
            cage_locks,
            event_bus,
        }
    }

    async fn load(&self, id: CageId) -> ParkResult<Cage> {
        self.cage_repository
            .find_by_id(id)
            .await?
            .ok_or(ParkError::CageNotFound(id))
    }

    /// Validate a create request and turn it into storable values
    fn plan_create(request: &CreateCageRequest) -> ParkResult<(NewCage, Vec<NewSpecies>)> {
        let max_capacity = request.max_capacity.unwrap_or(DEFAULT_MAX_CAPACITY);
        let requested = request.capacity.unwrap_or(0);
        capacity::validate_bounds(requested, max_capacity)?;

        let groups = request
            .species
            .iter()
            .map(|input| {
                let diet = input.diet.clone().ok_or(ValidationError::MissingField("diet"))?;
                NewSpecies::new(
                    input.name.clone(),
                    diet,
                    input.quantity.unwrap_or(DEFAULT_QUANTITY),
                    None,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        // With groups supplied the occupant count is derived from them
        let occupants = if groups.is_empty() {
            requested
        } else {
            let drafts: Vec<Species> = groups.iter().map(NewSpecies::draft).collect();
            let refs: Vec<&Species> = drafts.iter().collect();
            diet::check_group(&refs)?;
            capacity::projected_occupancy(groups.iter().map(|g| g.quantity), max_capacity)?
        };

        capacity::check_power_transition(occupants, request.status)?;

        Ok((NewCage::new(occupants, max_capacity, request.status)?, groups))
    }

    /// Remove a cage whose groups could not all be stored
    async fn discard_partial(&self, cage_id: CageId, housed: &[Species]) {
        warn!(cage_id = %cage_id, housed = housed.len(), "Rolling back partially created cage");
        for species in housed {
            if let Err(e) = self.species_repository.delete(species.id).await {
                error!(species_id = %species.id, error = %e, "Failed to roll back species");
            }
        }
        if let Err(e) = self.cage_repository.delete(cage_id).await {
            error!(cage_id = %cage_id, error = %e, "Failed to roll back cage");
        }
    }
}

#[async_trait]
impl CageService for StandardCageService {
    async fn create_cage(&self, request: CreateCageRequest) -> ParkResult<CageWithSpecies> {
        let (new_cage, groups) = Self::plan_create(&request)?;

        let cage = self.cage_repository.create(&new_cage).await?;
        let _guard = self.cage_locks.lock([cage.id]).await;

        let mut species = Vec::with_capacity(groups.len());
        for mut group in groups {
            group.cage_id = Some(cage.id);
            match self.species_repository.create(&group).await {
                Ok(created) => species.push(created),
                Err(e) => {
                    self.discard_partial(cage.id, &species).await;
                    return Err(e.into());
                }
            }
        }

        info!(cage_id = %cage.id, status = %cage.status, max_capacity = cage.max_capacity, "Cage created");
        self.event_bus.publish_cage_event(CageEvent::CageCreated {
            cage_id: cage.id,
            status: cage.status,
            max_capacity: cage.max_capacity,
            created_at: cage.created_at,
        });
        for created in &species {
            self.event_bus.publish_species_event(SpeciesEvent::SpeciesCreated {
                species_id: created.id,
                name: created.name.clone(),
                cage_id: created.cage_id,
                created_at: created.created_at,
            });
        }

        if species.is_empty() {
            return Ok(CageWithSpecies { cage, species });
        }

        let cage = occupancy::recompute_capacity(
            self.cage_repository.as_ref(),
            self.species_repository.as_ref(),
            &self.event_bus,
            cage.id,
        )
        .await?
        .unwrap_or(cage);

        Ok(CageWithSpecies { cage, species })
    }

    async fn get_cage(&self, id: CageId) -> ParkResult<CageWithSpecies> {
        let cage = self.load(id).await?;
        let species = self.species_repository.find_by_cage(id).await?;
        Ok(CageWithSpecies { cage, species })
    }

    async fn list_cages(&self) -> ParkResult<Vec<Cage>> {
        Ok(self.cage_repository.list_all().await?)
    }

    async fn list_cages_by_status(&self, status: CageStatus) -> ParkResult<Vec<Cage>> {
        Ok(self.cage_repository.find_by_status(status).await?)
    }

    async fn update_cage(&self, id: CageId, request: UpdateCageRequest) -> ParkResult<Cage> {
        info!(cage_id = %id, "Updating cage");
        self.load(id).await?;
        let _guard = self.cage_locks.lock([id]).await;
        let mut cage = self.load(id).await?;
        let previous_status = cage.status;

        if let Some(proposed) = request.capacity {
            capacity::validate_capacity(proposed, request.max_capacity)?;
        }

        // Capacity follows the stored groups; it can be restated, not overridden
        let occupants = self.species_repository.sum_quantity_by_cage(id).await?;
        if let Some(proposed) = request.capacity.filter(|c| *c != occupants) {
            return Err(ValidationError::CapacityMismatch {
                capacity: proposed,
                occupants,
            }
            .into());
        }

        // Powering down is judged against the stored head count
        if let Some(status) = request.status {
            capacity::check_power_transition(cage.capacity.max(occupants), status)?;
            cage.set_status(status)?;
        }
        cage.set_bounds(request.capacity, request.max_capacity)?;

        if cage.status == CageStatus::Down && cage.capacity > 0 {
            return Err(ValidationError::CagePoweredDownWithOccupants {
                capacity: cage.capacity,
            }
            .into());
        }

        self.cage_repository.save(&cage).await?;

        let now = Utc::now();
        self.event_bus.publish_cage_event(CageEvent::CageUpdated {
            cage_id: id,
            status: cage.status,
            capacity: cage.capacity,
            max_capacity: cage.max_capacity,
            updated_at: now,
        });
        if previous_status == CageStatus::Active && cage.status == CageStatus::Down {
            info!(cage_id = %id, "Cage powered down");
            self.event_bus.publish_cage_event(CageEvent::CagePoweredDown {
                cage_id: id,
                powered_down_at: now,
            });
        }

        Ok(cage)
    }

    async fn delete_cage(&self, id: CageId) -> ParkResult<()> {
        self.load(id).await?;
        let guard = self.cage_locks.lock([id]).await;
        self.load(id).await?;

        let unassigned = self.species_repository.unassign_cage(id).await?;
        if unassigned > 0 {
            warn!(cage_id = %id, unassigned, "Deleting occupied cage; species left unassigned");
        }
        self.cage_repository.delete(id).await?;
        drop(guard);

        info!(cage_id = %id, "Cage deleted");
        self.event_bus.publish_cage_event(CageEvent::CageDeleted {
            cage_id: id,
            unassigned_species: unassigned,
            deleted_at: Utc::now(),
        });
        Ok(())
    }
}
