// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Repository Interfaces
//!
//! Persistence contracts for the two aggregates, following the DDD Repository
//! pattern: interfaces live in the domain layer and are implemented in
//! `crate::infrastructure::repositories`.
//!
//! | Trait | Aggregate | Implementations |
//! |-------|-----------|----------------|
//! | `CageRepository` | `Cage` | `InMemoryCageRepository`, `PostgresCageRepository` |
//! | `SpeciesRepository` | `Species` | `InMemorySpeciesRepository`, `PostgresSpeciesRepository` |
//!
//! ## Storage Backend Abstraction
//!
//! The backend is chosen at startup from `park-config.yaml`. In-memory
//! storage is used for development and tests, PostgreSQL in production.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::cage::{Cage, CageId, CageStatus, NewCage};
use crate::domain::species::{NewSpecies, Species, SpeciesId};

/// Storage backend enum for pluggable persistence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageBackend {
    InMemory,
    #[serde(rename = "postgres")]
    PostgreSQL(PostgresConfig),
}

impl Default for StorageBackend {
    fn default() -> Self {
        Self::InMemory
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostgresConfig {
    pub connection_string: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

/// Repository interface for Cage aggregates
#[async_trait]
pub trait CageRepository: Send + Sync {
    /// Insert a new cage and return it with its assigned id
    async fn create(&self, cage: &NewCage) -> Result<Cage, RepositoryError>;

    /// Overwrite an existing cage
    async fn save(&self, cage: &Cage) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: CageId) -> Result<Option<Cage>, RepositoryError>;

    async fn find_by_status(&self, status: CageStatus) -> Result<Vec<Cage>, RepositoryError>;

    /// List all cages ordered by id
    async fn list_all(&self) -> Result<Vec<Cage>, RepositoryError>;

    async fn delete(&self, id: CageId) -> Result<(), RepositoryError>;

    async fn count(&self) -> Result<usize, RepositoryError>;
}

/// Repository interface for Species entries
#[async_trait]
pub trait SpeciesRepository: Send + Sync {
    /// Insert a new species entry and return it with its assigned id
    async fn create(&self, species: &NewSpecies) -> Result<Species, RepositoryError>;

    /// Overwrite an existing species entry
    async fn save(&self, species: &Species) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: SpeciesId) -> Result<Option<Species>, RepositoryError>;

    /// All entries with exactly this name
    async fn find_by_name(&self, name: &str) -> Result<Vec<Species>, RepositoryError>;

    /// All entries currently assigned to a cage
    async fn find_by_cage(&self, cage_id: CageId) -> Result<Vec<Species>, RepositoryError>;

    /// List all entries ordered by id
    async fn list_all(&self) -> Result<Vec<Species>, RepositoryError>;

    /// Sum of `quantity` over every entry assigned to a cage (0 when empty)
    async fn sum_quantity_by_cage(&self, cage_id: CageId) -> Result<i64, RepositoryError>;

    /// Detach every entry from a cage, returning how many were moved
    async fn unassign_cage(&self, cage_id: CageId) -> Result<u64, RepositoryError>;

    async fn delete(&self, id: SpeciesId) -> Result<(), RepositoryError>;
}

/// Repository errors
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound("Row not found".to_string()),
            _ => RepositoryError::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::Serialization(err.to_string())
    }
}
