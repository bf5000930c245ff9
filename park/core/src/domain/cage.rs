// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::capacity;
use crate::domain::species::Species;
use crate::domain::validation::ValidationError;

// ============================================================================
// Value Objects
// ============================================================================

/// Store-assigned cage identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CageId(pub i64);

impl std::fmt::Display for CageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Power state of a cage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CageStatus {
    Active,
    Down,
}

impl CageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Down => "DOWN",
        }
    }

    /// Whether species may be moved into a cage in this state
    pub fn accepts_occupants(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl FromStr for CageStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(Self::Active),
            "DOWN" => Ok(Self::Down),
            other => Err(ValidationError::InvalidStatus(other.to_string())),
        }
    }
}

impl std::fmt::Display for CageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default upper bound for a new cage when none is given
pub const DEFAULT_MAX_CAPACITY: i64 = 4;

// ============================================================================
// Aggregate Root: Cage
// ============================================================================

/// Cage aggregate root
///
/// `capacity` is derived: it is the sum of `quantity` over every species
/// assigned to the cage and is recomputed whenever that membership changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cage {
    pub id: CageId,
    pub capacity: i64,
    pub max_capacity: i64,
    pub status: CageStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Attributes of a cage that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCage {
    pub capacity: i64,
    pub max_capacity: i64,
    pub status: CageStatus,
}

impl NewCage {
    /// Build a new cage, enforcing the capacity bounds
    pub fn new(capacity: i64, max_capacity: i64, status: CageStatus) -> Result<Self, ValidationError> {
        capacity::validate_bounds(capacity, max_capacity)?;
        Ok(Self { capacity, max_capacity, status })
    }
}

impl Cage {
    /// Change the power state.
    ///
    /// Powering down is only allowed while the cage is empty; the check uses
    /// the stored capacity, not any capacity proposed alongside the change.
    pub fn set_status(&mut self, status: CageStatus) -> Result<(), ValidationError> {
        capacity::check_power_transition(self.capacity, status)?;
        self.status = status;
        self.touch();
        Ok(())
    }

    /// Replace capacity and/or max capacity, validating the merged pair
    pub fn set_bounds(&mut self, capacity: Option<i64>, max_capacity: Option<i64>) -> Result<(), ValidationError> {
        let next_capacity = capacity.unwrap_or(self.capacity);
        let next_max = max_capacity.unwrap_or(self.max_capacity);
        capacity::validate_bounds(next_capacity, next_max)?;

        self.capacity = next_capacity;
        self.max_capacity = next_max;
        self.touch();
        Ok(())
    }

    /// Store a freshly aggregated occupant count
    pub fn record_occupancy(&mut self, occupants: i64) {
        self.capacity = occupants;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Cage detail view: the cage together with the species it holds
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CageWithSpecies {
    #[serde(flatten)]
    pub cage: Cage,
    pub species: Vec<Species>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cage(capacity: i64, max_capacity: i64, status: CageStatus) -> Cage {
        let now = Utc::now();
        Cage {
            id: CageId(1),
            capacity,
            max_capacity,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("ACTIVE".parse::<CageStatus>().unwrap(), CageStatus::Active);
        assert_eq!("DOWN".parse::<CageStatus>().unwrap(), CageStatus::Down);
        assert!(matches!(
            "down".parse::<CageStatus>(),
            Err(ValidationError::InvalidStatus(_))
        ));
    }

    #[test]
    fn test_status_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&CageStatus::Down).unwrap(), "\"DOWN\"");
        let parsed: CageStatus = serde_json::from_str("\"ACTIVE\"").unwrap();
        assert_eq!(parsed, CageStatus::Active);
    }

    #[test]
    fn test_new_cage_bounds() {
        assert!(NewCage::new(0, 4, CageStatus::Active).is_ok());
        assert_eq!(
            NewCage::new(-1, 4, CageStatus::Active),
            Err(ValidationError::NegativeCapacity(-1))
        );
        assert_eq!(
            NewCage::new(5, 4, CageStatus::Active),
            Err(ValidationError::CapacityExceedsMax { capacity: 5, max_capacity: 4 })
        );
        assert_eq!(
            NewCage::new(1, 0, CageStatus::Active),
            Err(ValidationError::CapacityExceedsMax { capacity: 1, max_capacity: 0 })
        );
    }

    #[test]
    fn test_power_down_requires_empty_cage() {
        let mut empty = cage(0, 4, CageStatus::Active);
        empty.set_status(CageStatus::Down).unwrap();
        assert_eq!(empty.status, CageStatus::Down);

        let mut occupied = cage(4, 4, CageStatus::Active);
        assert_eq!(
            occupied.set_status(CageStatus::Down),
            Err(ValidationError::CagePoweredDownWithOccupants { capacity: 4 })
        );
        assert_eq!(occupied.status, CageStatus::Active);

        // Powering back up is always allowed
        let mut down = cage(0, 4, CageStatus::Down);
        down.set_status(CageStatus::Active).unwrap();
        assert_eq!(down.status, CageStatus::Active);
    }

    #[test]
    fn test_set_bounds_validates_merged_pair() {
        let mut c = cage(3, 4, CageStatus::Active);
        assert_eq!(
            c.set_bounds(None, Some(2)),
            Err(ValidationError::CapacityExceedsMax { capacity: 3, max_capacity: 2 })
        );
        assert_eq!(c.max_capacity, 4);

        c.set_bounds(Some(2), Some(2)).unwrap();
        assert_eq!((c.capacity, c.max_capacity), (2, 2));
    }

    #[test]
    fn test_detail_view_flattens_cage() {
        let view = CageWithSpecies {
            cage: cage(0, 4, CageStatus::Active),
            species: vec![],
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["maxCapacity"], 4);
        assert_eq!(json["status"], "ACTIVE");
        assert!(json["species"].as_array().unwrap().is_empty());
    }
}
