// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Seeded fixture records and the UI flows that edit them
//!
//! The application's test database ships with one known record per entity
//! kind. Scenarios corrupt a record with a payload and must put it back
//! before anyone else reads it, so every kind carries a static contract:
//! how to reach its edit form, which fields it has, their seeded values,
//! and how it is restored.

mod entity;
#[cfg(test)]
pub(crate) mod fake;
mod helper;
mod lock;

pub use entity::{EntityContract, EntityKind, Navigation, RestorePath};
pub use helper::{CleanupOutcome, SchoolMate};
pub use lock::{lock, try_lock, FixtureGuard};
