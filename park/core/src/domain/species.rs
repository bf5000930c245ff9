// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::cage::CageId;
use crate::domain::capacity;
use crate::domain::validation::ValidationError;

/// Store-assigned species identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeciesId(pub i64);

impl std::fmt::Display for SpeciesId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a species eats, e.g. `Carnivore` or `Herbivore`.
///
/// Kept as an open string so new diets need no code change. Comparison is
/// exact; only the `Carnivore` designation carries extra rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diet(String);

impl Diet {
    pub const CARNIVORE: &'static str = "Carnivore";
    pub const HERBIVORE: &'static str = "Herbivore";

    pub fn new(diet: impl Into<String>) -> Self {
        Self(diet.into())
    }

    pub fn carnivore() -> Self {
        Self::new(Self::CARNIVORE)
    }

    pub fn herbivore() -> Self {
        Self::new(Self::HERBIVORE)
    }

    pub fn is_carnivore(&self) -> bool {
        self.0 == Self::CARNIVORE
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Diet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A group of animals of one species, optionally housed in a cage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Species {
    pub id: SpeciesId,
    pub name: String,
    pub diet: Diet,
    pub quantity: i64,
    /// `None` while the group is not assigned to any cage
    pub cage_id: Option<CageId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Default number of individuals in a new species entry
pub const DEFAULT_QUANTITY: i64 = 1;

/// Attributes of a species entry that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSpecies {
    pub name: String,
    pub diet: Diet,
    pub quantity: i64,
    pub cage_id: Option<CageId>,
}

impl NewSpecies {
    pub fn new(
        name: impl Into<String>,
        diet: Diet,
        quantity: i64,
        cage_id: Option<CageId>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        if diet.as_str().trim().is_empty() {
            return Err(ValidationError::MissingField("diet"));
        }
        capacity::validate_quantity(quantity)?;

        Ok(Self { name, diet, quantity, cage_id })
    }

    /// The entity this entry would become, for running policies before the
    /// insert. Carries id 0, which the store never assigns.
    pub fn draft(&self) -> Species {
        let now = Utc::now();
        Species {
            id: SpeciesId(0),
            name: self.name.clone(),
            diet: self.diet.clone(),
            quantity: self.quantity,
            cage_id: self.cage_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of a species entry.
///
/// Every field is explicit: `None` leaves the stored value alone. For
/// `cage_id`, `Some(None)` unassigns the species and `Some(Some(id))` moves it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpeciesChanges {
    pub name: Option<String>,
    pub diet: Option<Diet>,
    pub quantity: Option<i64>,
    pub cage_id: Option<Option<CageId>>,
}

impl SpeciesChanges {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(ValidationError::MissingField("name"));
            }
        }
        if let Some(diet) = &self.diet {
            if diet.as_str().trim().is_empty() {
                return Err(ValidationError::MissingField("diet"));
            }
        }
        if let Some(quantity) = self.quantity {
            capacity::validate_quantity(quantity)?;
        }
        Ok(())
    }
}

impl Species {
    /// Apply a validated partial update, returning the resulting entity
    pub fn with_changes(&self, changes: &SpeciesChanges) -> Species {
        let mut next = self.clone();
        if let Some(name) = &changes.name {
            next.name = name.clone();
        }
        if let Some(diet) = &changes.diet {
            next.diet = diet.clone();
        }
        if let Some(quantity) = changes.quantity {
            next.quantity = quantity;
        }
        if let Some(cage_id) = changes.cage_id {
            next.cage_id = cage_id;
        }
        next.updated_at = Utc::now();
        next
    }
}
