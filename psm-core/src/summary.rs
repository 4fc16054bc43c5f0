//! Dashboard aggregates for one city.

use chrono::{DateTime, Utc};
use psm_utils::dates::same_local_day;
use serde::Serialize;

use crate::error::Result;
use crate::ponding_point::PondingPoint;
use crate::spell::Spell;
use crate::store::MonitorStore;
use crate::validate::required_text;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CitySummary {
    pub city: String,
    pub spell_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spell_started: Option<DateTime<Utc>>,
    pub point_count: usize,
    /// Points with rainfall recorded in the active spell.
    pub raining_points: usize,
    /// Highest `current_spell` across points (mm).
    pub max_current_spell: f64,
    /// Highest daily max among points updated today (mm).
    pub max_spell_today: f64,
    /// Deepest current ponding across points (inches).
    pub max_ponding: f64,
}

impl CitySummary {
    pub fn from_points(city: &str, points: &[PondingPoint], active: Option<&Spell>, now: &DateTime<Utc>) -> CitySummary {
        CitySummary {
            city: city.to_string(),
            spell_active: active.is_some(),
            spell_started: active.map(|s| s.start_time),
            point_count: points.len(),
            raining_points: points.iter().filter(|p| p.current_spell > 0.0).count(),
            max_current_spell: max_of(points.iter().map(|p| p.current_spell)),
            max_spell_today: max_of(
                points
                    .iter()
                    .filter(|p| p.updated_at.is_some_and(|at| same_local_day(&at, now)))
                    .map(|p| p.daily_max_spell),
            ),
            max_ponding: max_of(points.iter().map(|p| p.ponding)),
        }
    }

    /// Read the city's points and active spell and summarize them.
    pub fn load<S: MonitorStore + ?Sized>(store: &S, city: &str, now: &DateTime<Utc>) -> Result<CitySummary> {
        let city = required_text("city_name", "City name", city)?;
        let points = store.list_points(city)?;
        let active = store.find_active_spell(city)?;
        Ok(CitySummary::from_points(city, &points, active.as_ref(), now))
    }
}

/// Largest value, or 0 when empty.
fn max_of(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(0.0, f64::max)
}
