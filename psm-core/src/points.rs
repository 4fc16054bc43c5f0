//! Validated writes to ponding points.
//!
//! Every update runs the same pipeline: field validation, the
//! [clearance rule](crate::clearance), then the
//! [aggregation engine](crate::aggregation). Batches validate every point
//! before anything is written and then commit as one atomic write.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashSet;

use crate::aggregation::{apply_reading, seed_reading};
use crate::clearance;
use crate::error::{Error, Result};
use crate::ponding_point::PondingPoint;
use crate::store::{MonitorStore, WriteBatch, WriteOp};
use crate::validate::{non_negative, required_text};

/// A reading submitted for one point.
///
/// Without an `id` the input creates a new point. On update, `None` for
/// `name` or `cleared_in_time` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PointInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub current_spell: f64,
    pub ponding: f64,
    #[serde(default)]
    pub cleared_in_time: Option<String>,
}

impl PointInput {
    fn id(&self) -> Option<&str> {
        self.id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }
}

pub struct PondingPointService<'a, S: MonitorStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: MonitorStore + ?Sized> PondingPointService<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Points of `city_name`, ordered by name.
    pub fn list(&self, city_name: &str) -> Result<Vec<PondingPoint>> {
        let city_name = required_text("city_name", "City name", city_name)?;
        Ok(self.store.list_points(city_name)?)
    }

    /// Create a point, or update an existing point of `city_name`.
    pub fn add_or_update(&self, city_name: &str, input: &PointInput, now: DateTime<Utc>) -> Result<PondingPoint> {
        let city_name = required_text("city_name", "City name", city_name)?;
        let point = match input.id() {
            Some(id) => {
                let existing = self.existing(city_name, id)?;
                updated_point(&existing, input, now)?
            }
            None => new_point(city_name, input, now)?,
        };

        self.store
            .commit(WriteBatch::single(WriteOp::PutPoint(point.clone())))?;
        log::info!(
            "{} {} in {} (spell {} mm, ponding {} in)",
            if input.id().is_some() { "Updated" } else { "Created" },
            point.name,
            city_name,
            point.current_spell,
            point.ponding
        );
        Ok(point)
    }

    /// Update several existing points of `city_name` in one atomic write.
    ///
    /// Nothing is written unless every input passes; the error names the
    /// first failing point.
    pub fn batch_update(&self, city_name: &str, inputs: &[PointInput], now: DateTime<Utc>) -> Result<Vec<PondingPoint>> {
        let city_name = required_text("city_name", "City name", city_name)?;
        let mut seen = HashSet::new();
        let mut updated = Vec::with_capacity(inputs.len());

        for (index, input) in inputs.iter().enumerate() {
            let id = input.id().ok_or_else(|| {
                Error::validation("id", format!("Row {}: point ID is required for batch updates.", index + 1))
            })?;
            if !seen.insert(id) {
                return Err(Error::validation(
                    "id",
                    format!("Point {id} appears more than once in the batch."),
                ));
            }
            let existing = self.existing(city_name, id)?;
            let point = updated_point(&existing, input, now).map_err(|err| naming(err, &existing.name))?;
            updated.push(point);
        }

        if updated.is_empty() {
            return Ok(updated);
        }

        let mut batch = WriteBatch::new();
        batch.extend(updated.iter().cloned().map(WriteOp::PutPoint));
        self.store.commit(batch)?;
        log::info!("Batch updated {} points in {}", updated.len(), city_name);
        Ok(updated)
    }

    /// Remove a point. Archived spell data keeps its own copy of the name.
    pub fn delete(&self, id: &str) -> Result<()> {
        let id = id.trim();
        if id.is_empty() {
            return Err(Error::validation("id", "Cannot delete point without an ID."));
        }
        self.store
            .commit(WriteBatch::single(WriteOp::DeletePoint { id: id.to_string() }))?;
        log::info!("Deleted point {}", id);
        Ok(())
    }

    fn existing(&self, city_name: &str, id: &str) -> Result<PondingPoint> {
        self.store
            .get_point(id)?
            .filter(|p| p.city_name == city_name)
            .ok_or_else(|| Error::PointNotFound { id: id.to_string() })
    }
}

fn new_point(city_name: &str, input: &PointInput, now: DateTime<Utc>) -> Result<PondingPoint> {
    let name = required_text("name", "Name", input.name.as_deref().unwrap_or(""))?;
    let current_spell = non_negative("current_spell", "Spell", input.current_spell)?;
    let ponding = non_negative("ponding", "Ponding", input.ponding)?;
    let seeded = seed_reading(current_spell);

    Ok(PondingPoint {
        id: crate::new_id(),
        name: name.to_string(),
        city_name: city_name.to_string(),
        current_spell,
        max_spell_rainfall: seeded.max_spell_rainfall,
        cleared_in_time: input
            .cleared_in_time
            .as_deref()
            .unwrap_or("")
            .trim()
            .to_string(),
        ponding,
        is_raining: PondingPoint::raining_for(current_spell),
        daily_max_spell: seeded.daily_max_spell,
        updated_at: Some(now),
    })
}

fn updated_point(existing: &PondingPoint, input: &PointInput, now: DateTime<Utc>) -> Result<PondingPoint> {
    let name = match input.name.as_deref() {
        Some(name) => required_text("name", "Name", name)?.to_string(),
        None => existing.name.clone(),
    };
    let current_spell = non_negative("current_spell", "Spell", input.current_spell)?;
    let ponding = non_negative("ponding", "Ponding", input.ponding)?;
    let cleared_in = input.cleared_in_time.as_deref().map(str::trim);

    if clearance::validate(existing.ponding, ponding, cleared_in.unwrap_or("")).is_err() {
        log::warn!(
            "{} cleared ({} -> 0 in) without a clearance time",
            name,
            existing.ponding
        );
        return Err(Error::ClearanceRequired { point: name });
    }

    let aggregates = apply_reading(existing, current_spell, &now);
    Ok(PondingPoint {
        name,
        current_spell,
        max_spell_rainfall: aggregates.max_spell_rainfall,
        cleared_in_time: cleared_in
            .map(str::to_string)
            .unwrap_or_else(|| existing.cleared_in_time.clone()),
        ponding,
        is_raining: PondingPoint::raining_for(current_spell),
        daily_max_spell: aggregates.daily_max_spell,
        updated_at: Some(now),
        ..existing.clone()
    })
}

/// Prefix validation messages with the point they concern.
fn naming(err: Error, point: &str) -> Error {
    match err {
        Error::Validation { field, message } => Error::Validation {
            field,
            message: format!("{point}: {message}"),
        },
        other => other,
    }
}
