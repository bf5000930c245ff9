// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Jurassic Park inventory core
//!
//! Cages, the species groups they hold, and the rules that govern moving
//! animals between them.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Domain policies, use cases, storage adapters and the HTTP surface

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
