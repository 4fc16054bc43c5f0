//! Transactional writes and the [`MonitorStore`] implementation.

use psm_core::{Conflict, MonitorStore, WriteBatch, WriteOp};
use psm_core::{AccessRequest, City, PondingPoint, Spell};
use psm_utils::dates::format_timestamp;
use rusqlite::{params, ErrorCode, Transaction};

use crate::Database;

impl Database {
    /// Apply every operation of `batch` inside one SQLite transaction.
    ///
    /// Any failing operation rolls the whole batch back. Uniqueness and
    /// state precondition failures are reported as [`Conflict`].
    pub fn apply_batch(&self, batch: WriteBatch) -> anyhow::Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let ops = batch.len();
        let mut conn = self.conn.borrow_mut();
        let tx = conn.transaction()?;
        for op in batch {
            apply(&tx, op)?;
        }
        tx.commit()?;
        log::debug!("Committed batch of {} ops", ops);
        Ok(())
    }
}

fn apply(tx: &Transaction<'_>, op: WriteOp) -> anyhow::Result<()> {
    match op {
        WriteOp::InsertCity(city) => insert_city(tx, &city),
        WriteOp::PutPoint(point) => put_point(tx, &point),
        WriteOp::DeletePoint { id } => {
            tx.execute("DELETE FROM ponding_points WHERE id = ?1", params![id])?;
            Ok(())
        }
        WriteOp::InsertSpell(spell) => insert_spell(tx, &spell),
        WriteOp::CompleteSpell {
            id,
            end_time,
            spell_data,
        } => {
            let updated = tx.execute(
                "UPDATE spells SET status = 'completed', end_time = ?2
                 WHERE id = ?1 AND status = 'active'",
                params![id, format_timestamp(&end_time)],
            )?;
            if updated == 0 {
                return Err(Conflict(format!("spell {id} is not active")).into());
            }
            let mut stmt = tx.prepare(
                "INSERT INTO spell_entries
                 (spell_id, position, point_id, point_name, total_rainfall, ponding_level, cleared_in_time)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for (position, entry) in spell_data.iter().enumerate() {
                stmt.execute(params![
                    id,
                    position as i64,
                    entry.point_id,
                    entry.point_name,
                    entry.total_rainfall,
                    entry.ponding_level,
                    entry.cleared_in_time,
                ])?;
            }
            Ok(())
        }
        WriteOp::InsertAccessRequest(request) => insert_request(tx, &request),
    }
}

fn insert_city(tx: &Transaction<'_>, city: &City) -> anyhow::Result<()> {
    tx.execute(
        "INSERT INTO cities (id, name, latitude, longitude) VALUES (?1, ?2, ?3, ?4)",
        params![city.id, city.name, city.latitude, city.longitude],
    )
    .map_err(|e| conflict_or(e, || format!("city {} already exists", city.name)))?;
    Ok(())
}

fn put_point(tx: &Transaction<'_>, p: &PondingPoint) -> anyhow::Result<()> {
    tx.execute(
        "INSERT OR REPLACE INTO ponding_points
         (id, name, city_name, current_spell, max_spell_rainfall, cleared_in_time,
          ponding, is_raining, daily_max_spell, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            p.id,
            p.name,
            p.city_name,
            p.current_spell,
            p.max_spell_rainfall,
            p.cleared_in_time,
            p.ponding,
            p.is_raining,
            p.daily_max_spell,
            p.updated_at.as_ref().map(format_timestamp),
        ],
    )?;
    Ok(())
}

fn insert_spell(tx: &Transaction<'_>, spell: &Spell) -> anyhow::Result<()> {
    tx.execute(
        "INSERT INTO spells (id, city_name, start_time, end_time, status)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            spell.id,
            spell.city_name,
            format_timestamp(&spell.start_time),
            spell.end_time.as_ref().map(format_timestamp),
            spell.status.as_str(),
        ],
    )
    .map_err(|e| conflict_or(e, || format!("{} already has an active spell", spell.city_name)))?;
    Ok(())
}

fn insert_request(tx: &Transaction<'_>, r: &AccessRequest) -> anyhow::Result<()> {
    tx.execute(
        "INSERT INTO access_requests (id, email, role, assigned_city, status, requested_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            r.id,
            r.email,
            r.role.as_str(),
            r.assigned_city,
            r.status.as_str(),
            format_timestamp(&r.requested_at),
        ],
    )?;
    Ok(())
}

/// Constraint violations become [`Conflict`]; anything else passes through.
fn conflict_or(err: rusqlite::Error, message: impl FnOnce() -> String) -> anyhow::Error {
    if err.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) {
        Conflict(message()).into()
    } else {
        err.into()
    }
}

impl MonitorStore for Database {
    fn list_cities(&self) -> anyhow::Result<Vec<City>> {
        self.query_cities()
    }

    fn find_city(&self, name: &str) -> anyhow::Result<Option<City>> {
        self.query_city(name)
    }

    fn list_points(&self, city_name: &str) -> anyhow::Result<Vec<PondingPoint>> {
        self.query_points(city_name)
    }

    fn get_point(&self, id: &str) -> anyhow::Result<Option<PondingPoint>> {
        self.query_point(id)
    }

    fn find_active_spell(&self, city_name: &str) -> anyhow::Result<Option<Spell>> {
        self.query_active_spell(city_name)
    }

    fn latest_completed_spell(&self, city_name: &str) -> anyhow::Result<Option<Spell>> {
        self.query_latest_completed_spell(city_name)
    }

    fn find_pending_request(&self, email: &str) -> anyhow::Result<Option<AccessRequest>> {
        self.query_pending_request(email)
    }

    fn pending_requests(&self) -> anyhow::Result<Vec<AccessRequest>> {
        self.query_pending_requests()
    }

    fn commit(&self, batch: WriteBatch) -> anyhow::Result<()> {
        self.apply_batch(batch)
    }
}
