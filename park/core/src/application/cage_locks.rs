// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Per-cage async locks.
//!
//! Capacity is a derived value written back after a read of every occupant,
//! so two writers touching the same cage must not interleave. Every use case
//! that changes a cage's membership holds the lock for each cage it touches.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::cage::CageId;

type LockTable = DashMap<CageId, Arc<Mutex<()>>>;

#[derive(Clone, Default)]
pub struct CageLocks {
    locks: Arc<LockTable>,
}

/// Held locks; released on drop.
///
/// Entries nobody else is holding or waiting on are removed from the table
/// on release, so ids that are locked once (or never existed) do not linger.
#[must_use]
pub struct CageGuard {
    cages: Vec<CageId>,
    guards: Vec<OwnedMutexGuard<()>>,
    table: Arc<LockTable>,
}

impl CageGuard {
    /// Whether this guard covers every cage in `ids`
    pub fn covers(&self, ids: impl IntoIterator<Item = CageId>) -> bool {
        ids.into_iter().all(|id| self.cages.contains(&id))
    }
}

impl Drop for CageGuard {
    fn drop(&mut self) {
        self.guards.clear();
        for id in &self.cages {
            // One reference left means only the table itself holds the mutex
            self.table.remove_if(id, |_, mutex| Arc::strong_count(mutex) == 1);
        }
    }
}

impl CageLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock a set of cages.
    ///
    /// Ids are deduplicated and taken in ascending order so that two callers
    /// locking overlapping sets cannot deadlock.
    pub async fn lock(&self, ids: impl IntoIterator<Item = CageId>) -> CageGuard {
        let mut cages: Vec<CageId> = ids.into_iter().collect();
        cages.sort();
        cages.dedup();

        let mut guards = Vec::with_capacity(cages.len());
        for id in &cages {
            let mutex = self.locks.entry(*id).or_default().clone();
            guards.push(mutex.lock_owned().await);
        }

        CageGuard {
            cages,
            guards,
            table: self.locks.clone(),
        }
    }
}
