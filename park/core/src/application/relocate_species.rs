// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Relocate Species Use Case
//!
//! Applies a partial update to a species group, including moving it between
//! cages, while keeping every cage's derived capacity correct.
//!
//! # DDD Pattern: Application Service
//!
//! - **Layer:** Application
//! - **Responsibility:** Validate a placement, persist the group, recompute capacities
//! - **Collaborators:**
//!   - Domain: capacity and diet policies, `Species::with_changes`
//!   - Infrastructure: CageRepository, SpeciesRepository, EventBus, CageLocks
//!
//! # Flow
//!
//! 1. Load the species and validate the changes
//! 2. Lock the source and destination cages (ascending id order)
//! 3. Check the destination: exists, powered, diet compatible, room left
//! 4. Persist the species
//! 5. Recompute capacity for the destination and the cage it left
//! 6. Publish `SpeciesRelocated` / `SpeciesUpdated`
//!
//! A failure in steps 1-3 writes nothing.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::events::SpeciesEvent;
use crate::domain::repository::{CageRepository, SpeciesRepository};
use crate::domain::species::{Species, SpeciesChanges, SpeciesId};
use crate::infrastructure::event_bus::EventBus;

use super::cage_locks::CageLocks;
use super::occupancy::{self, Placement};
use super::{ParkError, ParkResult};

/// Relocate Species Use Case
#[async_trait]
pub trait RelocateSpeciesUseCase: Send + Sync {
    /// Apply `changes` to the species `id`.
    ///
    /// # Errors
    ///
    /// - SpeciesNotFound / CageNotFound
    /// - Validation: negative quantity, DOWN destination, diet conflict,
    ///   destination over `max_capacity`
    async fn relocate(&self, id: SpeciesId, changes: SpeciesChanges) -> ParkResult<Species>;
}

/// Standard implementation of RelocateSpeciesUseCase
pub struct StandardRelocateSpeciesUseCase {
    cage_repository: Arc<dyn CageRepository>,
    species_repository: Arc<dyn SpeciesRepository>,
    cage_locks: CageLocks,
    event_bus: Arc<EventBus>,
}

impl StandardRelocateSpeciesUseCase {
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

    async fn load(&self, id: SpeciesId) -> ParkResult<Species> {
        self.species_repository
            .find_by_id(id)
            .await?
            .ok_or(ParkError::SpeciesNotFound(id))
    }
}

#[async_trait]
impl RelocateSpeciesUseCase for StandardRelocateSpeciesUseCase {
    async fn relocate(&self, id: SpeciesId, changes: SpeciesChanges) -> ParkResult<Species> {
        info!(species_id = %id, "Updating species");

        changes.validate()?;
        let mut current = self.load(id).await?;

        // The stored cage can change between the read and the lock; retry
        // until the guard covers the cages the stored row actually points at.
        let _guard = loop {
            let proposed_cage = changes.cage_id.unwrap_or(current.cage_id);
            let guard = self
                .cage_locks
                .lock(current.cage_id.into_iter().chain(proposed_cage))
                .await;

            let fresh = self.load(id).await?;
            if guard.covers(fresh.cage_id) {
                current = fresh;
                break guard;
            }
            debug!(species_id = %id, "Species moved while waiting for cage lock, retrying");
            current = fresh;
        };

        let proposed = current.with_changes(&changes);
        let source = current.cage_id;
        let destination = proposed.cage_id;
        let moving = source != destination;

        if let Some(cage_id) = destination {
            let identity_changed = proposed.name != current.name || proposed.diet != current.diet;
            let quantity_changed = proposed.quantity != current.quantity;

            if moving || identity_changed || quantity_changed {
                let placement = Placement {
                    entering: moving,
                    growing: proposed.quantity > current.quantity,
                };
                occupancy::check_placement(
                    self.cage_repository.as_ref(),
                    self.species_repository.as_ref(),
                    cage_id,
                    &proposed,
                    placement,
                )
                .await?;
            }
        }

        self.species_repository.save(&proposed).await?;

        let quantity_changed = proposed.quantity != current.quantity;
        if let Some(cage_id) = destination.filter(|_| moving || quantity_changed) {
            occupancy::recompute_capacity(
                self.cage_repository.as_ref(),
                self.species_repository.as_ref(),
                &self.event_bus,
                cage_id,
            )
            .await?;
        }
        if let Some(cage_id) = source.filter(|_| moving) {
            occupancy::recompute_capacity(
                self.cage_repository.as_ref(),
                self.species_repository.as_ref(),
                &self.event_bus,
                cage_id,
            )
            .await?;
        }

        let now = Utc::now();
        if moving {
            info!(
                species_id = %id,
                from = ?source,
                to = ?destination,
                "Species relocated"
            );
            self.event_bus.publish_species_event(SpeciesEvent::SpeciesRelocated {
                species_id: id,
                from: source,
                to: destination,
                relocated_at: now,
            });
        } else {
            self.event_bus.publish_species_event(SpeciesEvent::SpeciesUpdated {
                species_id: id,
                updated_at: now,
            });
        }

        Ok(proposed)
    }
}
