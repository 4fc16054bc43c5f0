use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named monitored location where rainfall and standing water are recorded.
///
/// `city_name` links the point to its city by value; there is no id
/// reference across records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PondingPoint {
    pub id: String,
    pub name: String,
    pub city_name: String,
    /// Rainfall accumulated in the active spell (mm).
    pub current_spell: f64,
    /// High-water mark of `current_spell` across the current spell (mm).
    #[serde(default)]
    pub max_spell_rainfall: f64,
    /// Operator-entered clearance duration, free-form ("HH:MM" by convention).
    #[serde(default)]
    pub cleared_in_time: String,
    /// Current ponding depth (inches).
    pub ponding: f64,
    /// Mirrors `current_spell > 0`.
    pub is_raining: bool,
    /// High-water mark of `current_spell` for the calendar day of `updated_at` (mm).
    #[serde(default)]
    pub daily_max_spell: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl PondingPoint {
    /// `is_raining` as derived from a rainfall reading.
    pub fn raining_for(current_spell: f64) -> bool {
        current_spell > 0.0
    }

    /// Point state after its spell has been archived.
    pub fn reset_for_new_spell(&self) -> PondingPoint {
        PondingPoint {
            current_spell: 0.0,
            is_raining: false,
            max_spell_rainfall: 0.0,
            ..self.clone()
        }
    }
}
