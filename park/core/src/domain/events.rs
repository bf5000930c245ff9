// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::cage::{CageId, CageStatus};
use crate::domain::species::SpeciesId;

/// Cage lifecycle events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CageEvent {
    CageCreated {
        cage_id: CageId,
        status: CageStatus,
        max_capacity: i64,
        created_at: DateTime<Utc>,
    },
    CageUpdated {
        cage_id: CageId,
        status: CageStatus,
        capacity: i64,
        max_capacity: i64,
        updated_at: DateTime<Utc>,
    },
    CagePoweredDown {
        cage_id: CageId,
        powered_down_at: DateTime<Utc>,
    },
    CageCapacityRecomputed {
        cage_id: CageId,
        previous: i64,
        capacity: i64,
        recomputed_at: DateTime<Utc>,
    },
    CageDeleted {
        cage_id: CageId,
        unassigned_species: u64,
        deleted_at: DateTime<Utc>,
    },
}

/// Species placement events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SpeciesEvent {
    SpeciesCreated {
        species_id: SpeciesId,
        name: String,
        cage_id: Option<CageId>,
        created_at: DateTime<Utc>,
    },
    SpeciesUpdated {
        species_id: SpeciesId,
        updated_at: DateTime<Utc>,
    },
    SpeciesRelocated {
        species_id: SpeciesId,
        from: Option<CageId>,
        to: Option<CageId>,
        relocated_at: DateTime<Utc>,
    },
    SpeciesDeleted {
        species_id: SpeciesId,
        cage_id: Option<CageId>,
        deleted_at: DateTime<Utc>,
    },
}
