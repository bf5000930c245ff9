// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Connection Pool
//!
//! Wraps `sqlx::postgres::PgPool` in a thin `Database` newtype that is
//! injected into the PostgreSQL repository implementations.
//!
//! `ensure_schema` creates the two tables when they are missing. It is a
//! bootstrap for fresh databases, not a migration system.

use anyhow::{Context, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::domain::repository::PostgresConfig;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS cages (
        id BIGSERIAL PRIMARY KEY,
        capacity BIGINT NOT NULL DEFAULT 0 CHECK (capacity >= 0),
        max_capacity BIGINT NOT NULL DEFAULT 4 CHECK (max_capacity >= 0),
        status TEXT NOT NULL CHECK (status IN ('ACTIVE', 'DOWN')),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS species (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        diet TEXT NOT NULL,
        quantity BIGINT NOT NULL DEFAULT 1 CHECK (quantity >= 0),
        cage_id BIGINT NULL REFERENCES cages (id) ON DELETE SET NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS species_cage_id_idx ON species (cage_id)",
    "CREATE INDEX IF NOT EXISTS species_name_idx ON species (name)",
];

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn new(config: &PostgresConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.connection_string)
            .await
            .context("Failed to connect to PostgreSQL")?;

        Ok(Self { pool })
    }

    pub fn get_pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the `cages` and `species` tables if they do not exist yet
    pub async fn ensure_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .context("Failed to bootstrap database schema")?;
        }
        info!("Database schema ready");
        Ok(())
    }
}
