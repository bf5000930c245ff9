// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Application Layer
//!
//! Use cases that load aggregates, run the domain policies and write the
//! results back through the repository ports.
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`cage_service`] | Cage create / read / update / delete |
//! | [`species_service`] | Species create / read / delete, update via relocation |
//! | [`relocate_species`] | Species relocation workflow |
//! | [`occupancy`] | Placement checks and capacity recomputation shared by the above |
//! | [`cage_locks`] | Per-cage serialization of read-then-write sequences |
//! | [`services`] | Wires the services over a repository pair |
//! | [`repository_factory`] | Repository selection by storage backend |

pub mod cage_locks;
pub mod occupancy;
pub mod cage_service;
pub mod species_service;
pub mod relocate_species;
pub mod services;
pub mod repository_factory;

pub use cage_locks::CageLocks;
pub use cage_service::{CageService, CageSpeciesInput, StandardCageService, CreateCageRequest, UpdateCageRequest};
pub use species_service::{SpeciesService, StandardSpeciesService, CreateSpeciesRequest, UpdateSpeciesRequest};
pub use relocate_species::{RelocateSpeciesUseCase, StandardRelocateSpeciesUseCase};
pub use services::ParkServices;

use crate::domain::cage::CageId;
use crate::domain::repository::RepositoryError;
use crate::domain::species::SpeciesId;
use crate::domain::validation::ValidationError;

/// Errors surfaced by the application services
#[derive(Debug, thiserror::Error)]
pub enum ParkError {
    #[error("Cage not found: {0}")]
    CageNotFound(CageId),

    #[error("Species not found: {0}")]
    SpeciesNotFound(SpeciesId),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] RepositoryError),
}

impl ParkError {
    /// The validation failure behind this error, if any
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::CageNotFound(_) | Self::SpeciesNotFound(_) | Self::Store(RepositoryError::NotFound(_))
        )
    }
}

pub type ParkResult<T> = Result<T, ParkError>;
