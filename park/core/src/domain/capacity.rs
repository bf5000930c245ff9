// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Capacity Policy
//!
//! Pure checks over capacity numbers. Callers supply every value; nothing
//! here reads from the store.

use crate::domain::cage::CageStatus;
use crate::domain::validation::ValidationError;

/// Validate a proposed capacity against an optional upper bound.
///
/// A `max_capacity` of `None` or `Some(0)` counts as "not specified" and
/// only the sign of `capacity` is checked.
pub fn validate_capacity(capacity: i64, max_capacity: Option<i64>) -> Result<(), ValidationError> {
    if capacity < 0 {
        return Err(ValidationError::NegativeCapacity(capacity));
    }
    match max_capacity {
        Some(max) if max != 0 && capacity > max => Err(ValidationError::CapacityExceedsMax {
            capacity,
            max_capacity: max,
        }),
        _ => Ok(()),
    }
}

pub fn validate_max_capacity(max_capacity: i64) -> Result<(), ValidationError> {
    if max_capacity < 0 {
        return Err(ValidationError::NegativeMaxCapacity(max_capacity));
    }
    Ok(())
}

/// Validate a complete capacity/max pair as it will be stored.
///
/// Unlike [`validate_capacity`], a zero maximum is a real bound here.
pub fn validate_bounds(capacity: i64, max_capacity: i64) -> Result<(), ValidationError> {
    validate_max_capacity(max_capacity)?;
    validate_capacity(capacity, Some(max_capacity))?;
    if capacity > max_capacity {
        return Err(ValidationError::CapacityExceedsMax { capacity, max_capacity });
    }
    Ok(())
}

pub fn validate_quantity(quantity: i64) -> Result<(), ValidationError> {
    if quantity < 0 {
        return Err(ValidationError::NegativeQuantity(quantity));
    }
    Ok(())
}

/// A cage may only be powered down while nothing is living in it.
pub fn can_power_down(current_capacity: i64) -> bool {
    current_capacity == 0
}

/// Guard a status change against the cage's stored capacity
pub fn check_power_transition(current_capacity: i64, target: CageStatus) -> Result<(), ValidationError> {
    if target == CageStatus::Down && !can_power_down(current_capacity) {
        return Err(ValidationError::CagePoweredDownWithOccupants {
            capacity: current_capacity,
        });
    }
    Ok(())
}

/// Check that `occupants` animals fit into a cage bounded by `max_capacity`
pub fn check_fits(occupants: i64, max_capacity: i64) -> Result<(), ValidationError> {
    if occupants > max_capacity {
        return Err(ValidationError::CapacityExceedsMax {
            capacity: occupants,
            max_capacity,
        });
    }
    Ok(())
}

/// Add up head counts and check the total fits `max_capacity`.
///
/// A total that does not fit in an `i64` is larger than any cage.
pub fn projected_occupancy(
    quantities: impl IntoIterator<Item = i64>,
    max_capacity: i64,
) -> Result<i64, ValidationError> {
    let total = quantities
        .into_iter()
        .try_fold(0i64, |acc, quantity| acc.checked_add(quantity))
        .ok_or(ValidationError::CapacityExceedsMax {
            capacity: i64::MAX,
            max_capacity,
        })?;
    check_fits(total, max_capacity)?;
    Ok(total)
}
