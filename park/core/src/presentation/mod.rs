// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Presentation Layer (`jurassic-park-core`)
//!
//! HTTP surface that translates requests into application service calls.
//! No business rules live here.
//!
//! | Module | Transport | Description |
//! |--------|-----------|-------------|
//! | [`api`] | HTTP (Axum) | Cage and species CRUD endpoints with a uniform JSON envelope |

pub mod api;
