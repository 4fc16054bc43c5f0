use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a spell. `Completed` spells are immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpellStatus {
    Active,
    Completed,
}

impl SpellStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpellStatus::Active => "active",
            SpellStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for SpellStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpellStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(SpellStatus::Active),
            "completed" => Ok(SpellStatus::Completed),
            other => anyhow::bail!("unknown spell status: {other}"),
        }
    }
}

/// Final readings of one ponding point, captured when its spell stopped.
///
/// Point id and name are copied by value so the archive survives deletion
/// of the point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellDataEntry {
    pub point_id: String,
    pub point_name: String,
    /// Rainfall over the spell (mm).
    pub total_rainfall: f64,
    /// Ponding depth at stop time (inches).
    pub ponding_level: f64,
    pub cleared_in_time: String,
}

/// A bounded rainfall event for one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spell {
    pub id: String,
    pub city_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: SpellStatus,
    /// Empty while active; populated once at stop time.
    pub spell_data: Vec<SpellDataEntry>,
}

impl Spell {
    /// A freshly started spell.
    pub fn started(id: String, city_name: &str, start_time: DateTime<Utc>) -> Spell {
        Spell {
            id,
            city_name: city_name.to_string(),
            start_time,
            end_time: None,
            status: SpellStatus::Active,
            spell_data: Vec::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == SpellStatus::Active
    }

    /// Wall-clock length of the spell, if it has ended.
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.end_time.map(|end| end - self.start_time)
    }
}
