// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Cage Repository
//!
//! `CageRepository` backed by the `cages` table via `sqlx`. Ids come from the
//! table's `BIGSERIAL` sequence; status is stored as `'ACTIVE'` / `'DOWN'`.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;

use crate::domain::cage::{Cage, CageId, CageStatus, NewCage};
use crate::domain::repository::{CageRepository, RepositoryError};

const CAGE_COLUMNS: &str = "id, capacity, max_capacity, status, created_at, updated_at";

pub struct PostgresCageRepository {
    pool: PgPool,
}

impl PostgresCageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn cage_from_row(row: &PgRow) -> Result<Cage, RepositoryError> {
    let status_str: String = row.try_get("status")?;
    let status = status_str
        .parse::<CageStatus>()
        .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

    Ok(Cage {
        id: CageId(row.try_get("id")?),
        capacity: row.try_get("capacity")?,
        max_capacity: row.try_get("max_capacity")?,
        status,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl CageRepository for PostgresCageRepository {
    async fn create(&self, cage: &NewCage) -> Result<Cage, RepositoryError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO cages (capacity, max_capacity, status, created_at, updated_at)
            VALUES ($1, $2, $3, NOW(), NOW())
            RETURNING {CAGE_COLUMNS}
            "#
        ))
        .bind(cage.capacity)
        .bind(cage.max_capacity)
        .bind(cage.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to create cage: {}", e)))?;

        cage_from_row(&row)
    }

    async fn save(&self, cage: &Cage) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE cages
            SET capacity = $2, max_capacity = $3, status = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(cage.id.0)
        .bind(cage.capacity)
        .bind(cage.max_capacity)
        .bind(cage.status.as_str())
        .bind(cage.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to save cage: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("cage {}", cage.id)));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: CageId) -> Result<Option<Cage>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {CAGE_COLUMNS} FROM cages WHERE id = $1"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        row.as_ref().map(cage_from_row).transpose()
    }

    async fn find_by_status(&self, status: CageStatus) -> Result<Vec<Cage>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {CAGE_COLUMNS} FROM cages WHERE status = $1 ORDER BY id ASC"
        ))
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.iter().map(cage_from_row).collect()
    }

    async fn list_all(&self) -> Result<Vec<Cage>, RepositoryError> {
        let rows = sqlx::query(&format!("SELECT {CAGE_COLUMNS} FROM cages ORDER BY id ASC"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.iter().map(cage_from_row).collect()
    }

    async fn delete(&self, id: CageId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cages WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        Ok(())
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cages")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        Ok(count as usize)
    }
}
