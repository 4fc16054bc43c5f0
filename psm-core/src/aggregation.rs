//! Derived rainfall aggregates, recomputed on every point update.
//!
//! Two high-water marks are tracked per point:
//!
//! - **daily max spell**: highest `current_spell` seen on the calendar day of
//!   the last update. The first update on a new day resets it to the new
//!   reading.
//! - **max spell rainfall**: highest `current_spell` seen during the current
//!   spell. Only stopping the spell resets it.

use chrono::{DateTime, Local, TimeZone, Utc};
use psm_utils::dates::same_day_in;

use crate::ponding_point::PondingPoint;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aggregates {
    pub daily_max_spell: f64,
    pub max_spell_rainfall: f64,
}

/// Aggregates after `existing` receives a new rainfall reading at `now`.
///
/// Calendar days are taken in the local time zone.
pub fn apply_reading(existing: &PondingPoint, new_current_spell: f64, now: &DateTime<Utc>) -> Aggregates {
    apply_reading_in(existing, new_current_spell, now, &Local)
}

/// [`apply_reading`] with an explicit time zone for the day boundary.
pub fn apply_reading_in<Tz: TimeZone>(
    existing: &PondingPoint,
    new_current_spell: f64,
    now: &DateTime<Utc>,
    tz: &Tz,
) -> Aggregates {
    let same_day = existing
        .updated_at
        .map(|last| same_day_in(&last, now, tz))
        .unwrap_or(false);

    let daily_max_spell = if same_day {
        existing.daily_max_spell.max(new_current_spell)
    } else {
        new_current_spell
    };

    Aggregates {
        daily_max_spell,
        max_spell_rainfall: existing.max_spell_rainfall.max(new_current_spell),
    }
}

/// Aggregates of a newly created point: both marks equal the first reading.
pub fn seed_reading(current_spell: f64) -> Aggregates {
    Aggregates {
        daily_max_spell: current_spell,
        max_spell_rainfall: current_spell,
    }
}
