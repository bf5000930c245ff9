// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Species Repository
//!
//! `SpeciesRepository` backed by the `species` table. `cage_id` is a nullable
//! foreign key; `NULL` means the group is not housed anywhere.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;

use crate::domain::cage::CageId;
use crate::domain::repository::{RepositoryError, SpeciesRepository};
use crate::domain::species::{Diet, NewSpecies, Species, SpeciesId};

const SPECIES_COLUMNS: &str = "id, name, diet, quantity, cage_id, created_at, updated_at";

pub struct PostgresSpeciesRepository {
    pool: PgPool,
}

impl PostgresSpeciesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn species_from_row(row: &PgRow) -> Result<Species, RepositoryError> {
    let diet: String = row.try_get("diet")?;
    let cage_id: Option<i64> = row.try_get("cage_id")?;

    Ok(Species {
        id: SpeciesId(row.try_get("id")?),
        name: row.try_get("name")?,
        diet: Diet::new(diet),
        quantity: row.try_get("quantity")?,
        cage_id: cage_id.map(CageId),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl SpeciesRepository for PostgresSpeciesRepository {
    async fn create(&self, species: &NewSpecies) -> Result<Species, RepositoryError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO species (name, diet, quantity, cage_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, NOW(), NOW())
            RETURNING {SPECIES_COLUMNS}
            "#
        ))
        .bind(&species.name)
        .bind(species.diet.as_str())
        .bind(species.quantity)
        .bind(species.cage_id.map(|id| id.0))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to create species: {}", e)))?;

        species_from_row(&row)
    }

    async fn save(&self, species: &Species) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE species
            SET name = $2, diet = $3, quantity = $4, cage_id = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(species.id.0)
        .bind(&species.name)
        .bind(species.diet.as_str())
        .bind(species.quantity)
        .bind(species.cage_id.map(|id| id.0))
        .bind(species.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to save species: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("species {}", species.id)));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: SpeciesId) -> Result<Option<Species>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {SPECIES_COLUMNS} FROM species WHERE id = $1"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        row.as_ref().map(species_from_row).transpose()
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<Species>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {SPECIES_COLUMNS} FROM species WHERE name = $1 ORDER BY id ASC"
        ))
        .bind(name)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.iter().map(species_from_row).collect()
    }

    async fn find_by_cage(&self, cage_id: CageId) -> Result<Vec<Species>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {SPECIES_COLUMNS} FROM species WHERE cage_id = $1 ORDER BY id ASC"
        ))
        .bind(cage_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.iter().map(species_from_row).collect()
    }

    async fn list_all(&self) -> Result<Vec<Species>, RepositoryError> {
        let rows = sqlx::query(&format!("SELECT {SPECIES_COLUMNS} FROM species ORDER BY id ASC"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.iter().map(species_from_row).collect()
    }

    async fn sum_quantity_by_cage(&self, cage_id: CageId) -> Result<i64, RepositoryError> {
        // SUM over BIGINT yields NUMERIC; cast back so it decodes as i64
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(quantity), 0)::BIGINT FROM species WHERE cage_id = $1",
        )
        .bind(cage_id.0)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;
        Ok(total)
    }

    async fn unassign_cage(&self, cage_id: CageId) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            "UPDATE species SET cage_id = NULL, updated_at = NOW() WHERE cage_id = $1",
        )
        .bind(cage_id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, id: SpeciesId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM species WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        Ok(())
    }
}
