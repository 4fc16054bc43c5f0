//! The document store consumed by the services.
//!
//! Reads are filtered lookups by city, status or email. Every write goes
//! through [`MonitorStore::commit`], which applies a [`WriteBatch`]
//! atomically: either every operation is visible afterwards or none is.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::access::AccessRequest;
use crate::city::City;
use crate::ponding_point::PondingPoint;
use crate::spell::{Spell, SpellDataEntry};

/// A conditional write lost against the current store state.
///
/// Stores return this inside the `anyhow::Error` of [`MonitorStore::commit`]
/// when a batch violates a uniqueness or state precondition; the whole
/// batch is rolled back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("write conflict: {0}")]
pub struct Conflict(pub String);

impl Conflict {
    /// True when `err` is (or wraps) a [`Conflict`].
    pub fn is_conflict(err: &anyhow::Error) -> bool {
        err.downcast_ref::<Conflict>().is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    InsertCity(City),
    /// Insert, or replace the point with the same id.
    PutPoint(PondingPoint),
    /// Remove a point; absent ids are not an error.
    DeletePoint { id: String },
    /// Conflicts if the city already has an active spell.
    InsertSpell(Spell),
    /// Conflicts unless spell `id` is still active.
    CompleteSpell {
        id: String,
        end_time: DateTime<Utc>,
        spell_data: Vec<SpellDataEntry>,
    },
    InsertAccessRequest(AccessRequest),
}

/// Ordered operations committed as one unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(op: WriteOp) -> Self {
        Self { ops: vec![op] }
    }

    pub fn push(&mut self, op: WriteOp) {
        self.ops.push(op);
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl IntoIterator for WriteBatch {
    type Item = WriteOp;
    type IntoIter = std::vec::IntoIter<WriteOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}

impl Extend<WriteOp> for WriteBatch {
    fn extend<I: IntoIterator<Item = WriteOp>>(&mut self, iter: I) {
        self.ops.extend(iter);
    }
}

/// Collection-style store for cities, ponding points, spells and access
/// requests.
pub trait MonitorStore {
    /// All cities, ordered by name.
    fn list_cities(&self) -> anyhow::Result<Vec<City>>;

    fn find_city(&self, name: &str) -> anyhow::Result<Option<City>>;

    /// Points of one city, ordered by name.
    fn list_points(&self, city_name: &str) -> anyhow::Result<Vec<PondingPoint>>;

    fn get_point(&self, id: &str) -> anyhow::Result<Option<PondingPoint>>;

    fn find_active_spell(&self, city_name: &str) -> anyhow::Result<Option<Spell>>;

    /// Completed spell of the city with the latest `end_time`.
    fn latest_completed_spell(&self, city_name: &str) -> anyhow::Result<Option<Spell>>;

    fn find_pending_request(&self, email: &str) -> anyhow::Result<Option<AccessRequest>>;

    /// Pending access requests, oldest first.
    fn pending_requests(&self) -> anyhow::Result<Vec<AccessRequest>>;

    /// Apply `batch` atomically.
    fn commit(&self, batch: WriteBatch) -> anyhow::Result<()>;
}
