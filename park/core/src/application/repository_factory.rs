// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Repository Factory
//!
//! Picks the concrete repository implementations for the configured
//! storage backend, keeping the domain layer free of infrastructure types.

use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::repository::{CageRepository, RepositoryError, SpeciesRepository, StorageBackend};
use crate::infrastructure::repositories::postgres_cage::PostgresCageRepository;
use crate::infrastructure::repositories::postgres_species::PostgresSpeciesRepository;
use crate::infrastructure::repositories::{InMemoryCageRepository, InMemorySpeciesRepository};

fn require_pool(pool: Option<PgPool>) -> Result<PgPool, RepositoryError> {
    pool.ok_or_else(|| {
        RepositoryError::Database("PostgreSQL storage configured but no connection pool was provided".to_string())
    })
}

/// Creates a CageRepository implementation based on the configured backend
pub fn create_cage_repository(
    backend: &StorageBackend,
    pool: Option<PgPool>,
) -> Result<Arc<dyn CageRepository>, RepositoryError> {
    Ok(match backend {
        StorageBackend::InMemory => Arc::new(InMemoryCageRepository::new()),
        StorageBackend::PostgreSQL(_) => Arc::new(PostgresCageRepository::new(require_pool(pool)?)),
    })
}

/// Creates a SpeciesRepository implementation based on the configured backend
pub fn create_species_repository(
    backend: &StorageBackend,
    pool: Option<PgPool>,
) -> Result<Arc<dyn SpeciesRepository>, RepositoryError> {
    Ok(match backend {
        StorageBackend::InMemory => Arc::new(InMemorySpeciesRepository::new()),
        StorageBackend::PostgreSQL(_) => Arc::new(PostgresSpeciesRepository::new(require_pool(pool)?)),
    })
}
