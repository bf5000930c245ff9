// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Wiring of the application services over one pair of repositories.

use std::sync::Arc;

use crate::domain::repository::{CageRepository, SpeciesRepository};
use crate::infrastructure::event_bus::EventBus;

use super::cage_locks::CageLocks;
use super::cage_service::{CageService, StandardCageService};
use super::relocate_species::{RelocateSpeciesUseCase, StandardRelocateSpeciesUseCase};
use super::species_service::{SpeciesService, StandardSpeciesService};

/// Every service shares the same lock registry so a cage update and a
/// relocation into that cage exclude each other.
#[derive(Clone)]
pub struct ParkServices {
    pub cage_service: Arc<dyn CageService>,
    pub species_service: Arc<dyn SpeciesService>,
    pub relocation: Arc<dyn RelocateSpeciesUseCase>,
    pub event_bus: Arc<EventBus>,
}

impl ParkServices {
    pub fn new(
        cage_repository: Arc<dyn CageRepository>,
        species_repository: Arc<dyn SpeciesRepository>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        let cage_locks = CageLocks::new();

        let relocation: Arc<dyn RelocateSpeciesUseCase> = Arc::new(StandardRelocateSpeciesUseCase::new(
            cage_repository.clone(),
            species_repository.clone(),
            cage_locks.clone(),
            event_bus.clone(),
        ));

        let cage_service = Arc::new(StandardCageService::new(
            cage_repository.clone(),
            species_repository.clone(),
            cage_locks.clone(),
            event_bus.clone(),
        ));

        let species_service = Arc::new(StandardSpeciesService::new(
            cage_repository,
            species_repository,
            relocation.clone(),
            cage_locks,
            event_bus.clone(),
        ));

        Self {
            cage_service,
            species_service,
            relocation,
            event_bus,
        }
    }
}
