//! Creation / update timestamp policy.
//!
//! Entities only expose *where* their audit timestamps live through
//! [`Auditable`]; *when* they change is decided in one place,
//! [`stamp_timestamps`], which the persistence layer calls immediately before
//! every write. Any number of entity types can share the policy by
//! implementing the trait.

use chrono::Utc;

use crate::types::Timestamp;

/// An entity carrying `created_at` / `updated_at` audit columns.
pub trait Auditable {
    /// `true` until the storage layer has assigned an identifier.
    fn is_new(&self) -> bool;

    fn set_created_at(&mut self, at: Timestamp);

    fn set_updated_at(&mut self, at: Timestamp);
}

/// Source of "now" for the stamping policy.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall clock, UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// Clock frozen at a given instant. Used by tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}

/// Apply the audit policy to an entity about to be written.
///
/// `created_at` is set only on the first save (no id yet); `updated_at` is
/// set on every save. Both receive the same instant on creation.
pub fn stamp_timestamps<E: Auditable + ?Sized>(entity: &mut E, now: Timestamp) {
    if entity.is_new() {
        entity.set_created_at(now);
    }
    entity.set_updated_at(now);
}
