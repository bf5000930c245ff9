// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Validation Errors
//!
//! Typed failures returned by the capacity and diet policies and by request
//! validation in the application layer. Every variant is recoverable and is
//! reported to the caller; none of them abort the process.

use thiserror::Error;

use crate::domain::cage::CageId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Oops, capacity is less than zero! (capacity: {0})")]
    NegativeCapacity(i64),

    #[error("Oops, max capacity is less than zero! (maxCapacity: {0})")]
    NegativeMaxCapacity(i64),

    #[error("Oops, capacity exceeds max capacity! (capacity: {capacity}, maxCapacity: {max_capacity})")]
    CapacityExceedsMax { capacity: i64, max_capacity: i64 },

    #[error("Oops, quantity is less than zero! (quantity: {0})")]
    NegativeQuantity(i64),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid cage status: {0} (expected ACTIVE or DOWN)")]
    InvalidStatus(String),

    #[error("Oops, diets do not match! {candidate} cannot share a cage with {existing}")]
    DietMismatch { existing: String, candidate: String },

    #[error("Oops, carnivores cannot share a cage! {candidate} cannot share a cage with {existing}")]
    IncompatibleCarnivores { existing: String, candidate: String },

    #[error("Oops, cannot move to cage {0} with DOWN status!")]
    CageUnavailable(CageId),

    #[error("Oops, cannot power down cage with capacity > 0! (capacity: {capacity})")]
    CagePoweredDownWithOccupants { capacity: i64 },

    #[error("Oops, capacity must match the animals in the cage! (capacity: {capacity}, occupants: {occupants})")]
    CapacityMismatch { capacity: i64, occupants: i64 },
}
