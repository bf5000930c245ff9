// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Repository Implementations
//!
//! Infrastructure implementations of the repository ports defined in
//! `crate::domain::repository`.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Persist and retrieve cages and species
//! - **Pattern:** Repository (DDD), Adapter (Hexagonal Architecture)
//!
//! # Available Implementations
//!
//! ## PostgreSQL Repositories
//!
//! - **PostgresCageRepository** - `cages` table
//! - **PostgresSpeciesRepository** - `species` table, including the
//!   `SUM(quantity)` aggregate used for cage capacity
//!
//! ## In-Memory Repositories
//!
//! - **InMemoryCageRepository** / **InMemorySpeciesRepository** - thread-safe
//!   `BTreeMap` storage with sequential ids, used for development and tests
//!
//! # Usage
//!
//! ```no_run
//! # async fn demo() -> anyhow::Result<()> {
//! use park_core::domain::repository::{CageRepository, PostgresConfig};
//! use park_core::infrastructure::db::Database;
//! use park_core::infrastructure::repositories::postgres_cage::PostgresCageRepository;
//!
//! let config = PostgresConfig {
//!     connection_string: "postgres://localhost/park".to_string(),
//!     max_connections: 5,
//! };
//! let db = Database::new(&config).await?;
//! let repo = PostgresCageRepository::new(db.get_pool().clone());
//! let cages = repo.list_all().await?;
//! # Ok(())
//! # }
//! ```

pub mod postgres_cage;
pub mod postgres_species;

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::cage::{Cage, CageId, CageStatus, NewCage};
use crate::domain::repository::{CageRepository, RepositoryError, SpeciesRepository};
use crate::domain::species::{NewSpecies, Species, SpeciesId};

fn read_lock<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, RepositoryError> {
    lock.read()
        .map_err(|_| RepositoryError::Unknown("Failed to acquire read lock".to_string()))
}

fn write_lock<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, RepositoryError> {
    lock.write()
        .map_err(|_| RepositoryError::Unknown("Failed to acquire write lock".to_string()))
}

#[derive(Clone)]
pub struct InMemoryCageRepository {
    cages: Arc<RwLock<BTreeMap<CageId, Cage>>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryCageRepository {
    pub fn new() -> Self {
        Self {
            cages: Arc::new(RwLock::new(BTreeMap::new())),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

impl Default for InMemoryCageRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CageRepository for InMemoryCageRepository {
    async fn create(&self, cage: &NewCage) -> Result<Cage, RepositoryError> {
        let now = Utc::now();
        let created = Cage {
            id: CageId(self.next_id.fetch_add(1, Ordering::SeqCst)),
            capacity: cage.capacity,
            max_capacity: cage.max_capacity,
            status: cage.status,
            created_at: now,
            updated_at: now,
        };
        write_lock(&self.cages)?.insert(created.id, created.clone());
        Ok(created)
    }

    async fn save(&self, cage: &Cage) -> Result<(), RepositoryError> {
        let mut cages = write_lock(&self.cages)?;
        match cages.get_mut(&cage.id) {
            Some(stored) => {
                *stored = cage.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound(format!("cage {}", cage.id))),
        }
    }

    async fn find_by_id(&self, id: CageId) -> Result<Option<Cage>, RepositoryError> {
        Ok(read_lock(&self.cages)?.get(&id).cloned())
    }

    async fn find_by_status(&self, status: CageStatus) -> Result<Vec<Cage>, RepositoryError> {
        Ok(read_lock(&self.cages)?
            .values()
            .filter(|c| c.status == status)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Cage>, RepositoryError> {
        Ok(read_lock(&self.cages)?.values().cloned().collect())
    }

    async fn delete(&self, id: CageId) -> Result<(), RepositoryError> {
        write_lock(&self.cages)?.remove(&id);
        Ok(())
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        Ok(read_lock(&self.cages)?.len())
    }
}

#[derive(Clone)]
pub struct InMemorySpeciesRepository {
    species: Arc<RwLock<BTreeMap<SpeciesId, Species>>>,
    next_id: Arc<AtomicI64>,
}

impl InMemorySpeciesRepository {
    pub fn new() -> Self {
        Self {
            species: Arc::new(RwLock::new(BTreeMap::new())),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

impl Default for InMemorySpeciesRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeciesRepository for InMemorySpeciesRepository {
    async fn create(&self, species: &NewSpecies) -> Result<Species, RepositoryError> {
        let now = Utc::now();
        let created = Species {
            id: SpeciesId(self.next_id.fetch_add(1, Ordering::SeqCst)),
            name: species.name.clone(),
            diet: species.diet.clone(),
            quantity: species.quantity,
            cage_id: species.cage_id,
            created_at: now,
            updated_at: now,
        };
        write_lock(&self.species)?.insert(created.id, created.clone());
        Ok(created)
    }

    async fn save(&self, species: &Species) -> Result<(), RepositoryError> {
        let mut all = write_lock(&self.species)?;
        match all.get_mut(&species.id) {
            Some(stored) => {
                *stored = species.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound(format!("species {}", species.id))),
        }
    }

    async fn find_by_id(&self, id: SpeciesId) -> Result<Option<Species>, RepositoryError> {
        Ok(read_lock(&self.species)?.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<Species>, RepositoryError> {
        Ok(read_lock(&self.species)?
            .values()
            .filter(|s| s.name == name)
            .cloned()
            .collect())
    }

    async fn find_by_cage(&self, cage_id: CageId) -> Result<Vec<Species>, RepositoryError> {
        Ok(read_lock(&self.species)?
            .values()
            .filter(|s| s.cage_id == Some(cage_id))
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Species>, RepositoryError> {
        Ok(read_lock(&self.species)?.values().cloned().collect())
    }

    async fn sum_quantity_by_cage(&self, cage_id: CageId) -> Result<i64, RepositoryError> {
        read_lock(&self.species)?
            .values()
            .filter(|s| s.cage_id == Some(cage_id))
            .try_fold(0i64, |acc, s| acc.checked_add(s.quantity))
            .ok_or_else(|| {
                RepositoryError::Database(format!("occupant count of cage {} overflows", cage_id))
            })
    }

    async fn unassign_cage(&self, cage_id: CageId) -> Result<u64, RepositoryError> {
        let mut all = write_lock(&self.species)?;
        let now = Utc::now();
        let mut moved = 0;
        for species in all.values_mut().filter(|s| s.cage_id == Some(cage_id)) {
            species.cage_id = None;
            species.updated_at = now;
            moved += 1;
        }
        Ok(moved)
    }

    async fn delete(&self, id: SpeciesId) -> Result<(), RepositoryError> {
        write_lock(&self.species)?.remove(&id);
        Ok(())
    }
}
