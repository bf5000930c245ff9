// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Layer
//!
//! Entities, value objects and pure policies. Nothing in here performs I/O;
//! persistence is expressed through the ports in [`repository`].
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`cage`] | `Cage` aggregate, `CageId`, `CageStatus` |
//! | [`species`] | `Species` entity, `SpeciesId`, `Diet` |
//! | [`capacity`] | Capacity bounds and power-state guard |
//! | [`diet`] | Diet compatibility between co-housed species |
//! | [`validation`] | `ValidationError` taxonomy |
//! | [`repository`] | Repository ports and `RepositoryError` |
//! | [`events`] | Domain events published after successful writes |
//! | [`park_config`] | Service configuration manifest |

pub mod cage;
pub mod species;
pub mod capacity;
pub mod diet;
pub mod validation;
pub mod repository;
pub mod events;
pub mod park_config;
