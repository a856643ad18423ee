// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Per-entity locks over the shared fixture database
//!
//! The seeded records live in one remote database, so two scenarios that
//! corrupt and restore the same record must not interleave.

use std::sync::Arc;

use dashmap::DashMap;
use lazy_static::lazy_static;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::entity::EntityKind;

lazy_static! {
    static ref LOCKS: DashMap<EntityKind, Arc<Mutex<()>>> = DashMap::new();
}

/// Exclusive hold on one fixture record, released on drop
#[derive(Debug)]
pub struct FixtureGuard {
    kind: EntityKind,
    _guard: OwnedMutexGuard<()>,
}

impl FixtureGuard {
    pub fn kind(&self) -> EntityKind {
        self.kind
    }
}

fn mutex_for(kind: EntityKind) -> Arc<Mutex<()>> {
    LOCKS.entry(kind).or_default().clone()
}

/// Wait for exclusive use of a fixture record
pub async fn lock(kind: EntityKind) -> FixtureGuard {
    let guard = mutex_for(kind).lock_owned().await;
    tracing::debug!(entity = %kind, "Fixture locked");
    FixtureGuard {
        kind,
        _guard: guard,
    }
}

/// Take the record only if nobody else holds it
pub fn try_lock(kind: EntityKind) -> Option<FixtureGuard> {
    mutex_for(kind)
        .try_lock_owned()
        .ok()
        .map(|guard| FixtureGuard {
            kind,
            _guard: guard,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lock_is_exclusive_per_kind() {
        let held = lock(EntityKind::Term).await;
        assert_eq!(held.kind(), EntityKind::Term);
        assert!(try_lock(EntityKind::Term).is_none());
        assert!(try_lock(EntityKind::Class).is_some());

        drop(held);
        assert!(try_lock(EntityKind::Term).is_some());
    }
}
