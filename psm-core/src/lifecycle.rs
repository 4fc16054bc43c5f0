//! Spell start/stop state machine.
//!
//! Per city the states are *no active spell* and *spell active*.
//! Uniqueness of the active spell is checked before writing and again by
//! the store: [`WriteOp::InsertSpell`] and [`WriteOp::CompleteSpell`] are
//! conditional writes, and a lost race surfaces as the same error the
//! pre-check would have produced.

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::spell::{Spell, SpellDataEntry, SpellStatus};
use crate::store::{Conflict, MonitorStore, WriteBatch, WriteOp};
use crate::validate::required_text;

pub struct SpellLifecycle<'a, S: MonitorStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: MonitorStore + ?Sized> SpellLifecycle<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn active_spell(&self, city_name: &str) -> Result<Option<Spell>> {
        let city = required_text("city_name", "City name", city_name)?;
        Ok(self.store.find_active_spell(city)?)
    }

    /// The most recently completed spell of `city_name`, for reporting.
    pub fn latest_report(&self, city_name: &str) -> Result<Option<Spell>> {
        let city = required_text("city_name", "City name", city_name)?;
        Ok(self.store.latest_completed_spell(city)?)
    }

    /// Open a new spell for `city_name`.
    pub fn start_spell(&self, city_name: &str, now: DateTime<Utc>) -> Result<Spell> {
        let city = required_text("city_name", "City name", city_name)?;
        if self.store.find_active_spell(city)?.is_some() {
            log::warn!("Start rejected, {} already has an active spell", city);
            return Err(Error::AlreadyActive {
                city: city.to_string(),
            });
        }

        let spell = Spell::started(crate::new_id(), city, now);
        self.store
            .commit(WriteBatch::single(WriteOp::InsertSpell(spell.clone())))
            .map_err(|err| {
                if Conflict::is_conflict(&err) {
                    Error::AlreadyActive {
                        city: city.to_string(),
                    }
                } else {
                    Error::Store(err)
                }
            })?;
        log::info!("Started spell {} for {}", spell.id, city);
        Ok(spell)
    }

    /// Close the active spell of `city_name`.
    ///
    /// Requires every point of the city to report zero rainfall. The
    /// archive of final readings, the completion of the spell and the reset
    /// of every point are committed together.
    pub fn stop_spell(&self, city_name: &str, now: DateTime<Utc>) -> Result<Spell> {
        let city = required_text("city_name", "City name", city_name)?;
        let active = self
            .store
            .find_active_spell(city)?
            .ok_or_else(|| Error::NoActiveSpell {
                city: city.to_string(),
            })?;

        let points = self.store.list_points(city)?;
        let still_raining: Vec<String> = points
            .iter()
            .filter(|p| p.current_spell > 0.0)
            .map(|p| p.name.clone())
            .collect();
        if !still_raining.is_empty() {
            log::warn!(
                "Stop rejected for {}, rainfall still recorded at {} points",
                city,
                still_raining.len()
            );
            return Err(Error::RainfallStillActive {
                city: city.to_string(),
                points: still_raining,
            });
        }

        let spell_data: Vec<SpellDataEntry> = points
            .iter()
            .map(|p| SpellDataEntry {
                point_id: p.id.clone(),
                point_name: p.name.clone(),
                total_rainfall: p.max_spell_rainfall.max(p.current_spell),
                ponding_level: p.ponding,
                cleared_in_time: p.cleared_in_time.clone(),
            })
            .collect();

        let mut batch = WriteBatch::new();
        batch.extend(
            points
                .iter()
                .map(|p| WriteOp::PutPoint(p.reset_for_new_spell())),
        );
        batch.push(WriteOp::CompleteSpell {
            id: active.id.clone(),
            end_time: now,
            spell_data: spell_data.clone(),
        });

        self.store.commit(batch).map_err(|err| {
            if Conflict::is_conflict(&err) {
                Error::NoActiveSpell {
                    city: city.to_string(),
                }
            } else {
                Error::Store(err)
            }
        })?;

        log::info!(
            "Stopped spell {} for {}, archived {} points",
            active.id,
            city,
            spell_data.len()
        );
        Ok(Spell {
            end_time: Some(now),
            status: SpellStatus::Completed,
            spell_data,
            ..active
        })
    }
}
