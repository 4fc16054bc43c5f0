//! Core records and rules for monitoring rainfall spells and street ponding.
//!
//! A *spell* is a bounded rainfall event for a city. While a spell is
//! active, operators record per-point rainfall (`current_spell`, mm) and
//! ponding depth (inches) at each monitored [`PondingPoint`]. Stopping the
//! spell archives every point's final readings into the [`Spell`] record
//! and resets the per-point transient fields.
//!
//! All persistence goes through the [`MonitorStore`] trait; services borrow
//! a store handle owned by the caller:
//!
//! - [`SpellLifecycle`] - start/stop state machine per city
//! - [`PondingPointService`] - validated create/update/batch/delete of points
//! - [`CityRegistry`] - city administration
//! - [`AccessRequests`] - sign-up requests for city users and viewers
//!
//! The pure pieces ([`aggregation`], [`clearance`], [`summary`],
//! [`weather`]) carry no I/O and can be used directly.

pub mod access;
pub mod aggregation;
pub mod city;
pub mod clearance;
pub mod error;
pub mod lifecycle;
pub mod ponding_point;
pub mod points;
pub mod spell;
pub mod store;
pub mod summary;
pub mod weather;

mod validate;

#[cfg(test)]
mod testing;

pub use access::{AccessRequest, AccessRequestInput, AccessRequests, RequestStatus, Role};
pub use city::{City, CityInput, CityRegistry};
pub use error::{Error, Result};
pub use lifecycle::SpellLifecycle;
pub use ponding_point::PondingPoint;
pub use points::{PointInput, PondingPointService};
pub use spell::{Spell, SpellDataEntry, SpellStatus};
pub use store::{Conflict, MonitorStore, WriteBatch, WriteOp};
pub use summary::CitySummary;
pub use weather::{WeatherCondition, WeatherReading, WeatherSource};

/// Generate a new random document id.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
