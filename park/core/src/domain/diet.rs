// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Diet Compatibility Policy
//!
//! Decides whether two species groups may share a cage:
//!
//! 1. A cage is diet-homogeneous: differing diets never coexist.
//! 2. Carnivores only live with their own kind: two carnivorous groups
//!    coexist only when they are the same species (same name).
//! 3. Anything else with a matching diet may share.
//!
//! The relation is symmetric.

use crate::domain::species::Species;
use crate::domain::validation::ValidationError;

pub fn can_coexist(existing: &Species, candidate: &Species) -> Result<bool, ValidationError> {
    if existing.diet != candidate.diet {
        return Err(ValidationError::DietMismatch {
            existing: format!("{} ({})", existing.name, existing.diet),
            candidate: format!("{} ({})", candidate.name, candidate.diet),
        });
    }

    if existing.diet.is_carnivore() && existing.name != candidate.name {
        return Err(ValidationError::IncompatibleCarnivores {
            existing: existing.name.clone(),
            candidate: candidate.name.clone(),
        });
    }

    Ok(true)
}

/// Check a candidate against every current occupant of a cage.
///
/// The candidate's own row is skipped when it is already among the
/// occupants. Stops at the first incompatible occupant.
pub fn check_cage_occupants<'a, I>(occupants: I, candidate: &Species) -> Result<(), ValidationError>
where
    I: IntoIterator<Item = &'a Species>,
{
    for occupant in occupants {
        if occupant.id == candidate.id {
            continue;
        }
        can_coexist(occupant, candidate)?;
    }
    Ok(())
}

/// Check that a batch of groups moving into the same cage are pairwise compatible
pub fn check_group<'a>(group: &'a [&'a Species]) -> Result<(), ValidationError> {
    for (i, first) in group.iter().enumerate() {
        for second in &group[i + 1..] {
            can_coexist(first, second)?;
        }
    }
    Ok(())
}
