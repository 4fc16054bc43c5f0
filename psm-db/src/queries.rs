//! Typed read queries.
//!
//! All queries return records from `psm_core`. Timestamps are stored as
//! RFC 3339 text and parsed back on read; enum columns are stored as their
//! string forms.

use chrono::{DateTime, Utc};
use psm_core::{AccessRequest, City, PondingPoint, Spell, SpellDataEntry};
use psm_utils::dates::parse_timestamp;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::str::FromStr;

use crate::Database;

const POINT_COLUMNS: &str = "id, name, city_name, current_spell, max_spell_rainfall, \
     cleared_in_time, ponding, is_raining, daily_max_spell, updated_at";

const SPELL_COLUMNS: &str = "id, city_name, start_time, end_time, status";

const REQUEST_COLUMNS: &str = "id, email, role, assigned_city, status, requested_at";

impl Database {
    // ───────────────────── Cities ─────────────────────

    /// All cities, ordered by name.
    pub fn query_cities(&self) -> anyhow::Result<Vec<City>> {
        let conn = self.conn.borrow();
        let mut stmt =
            conn.prepare("SELECT id, name, latitude, longitude FROM cities ORDER BY name")?;
        let rows = stmt
            .query_map([], city_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!("query_cities returned {} records", rows.len());
        Ok(rows)
    }

    pub fn query_city(&self, name: &str) -> anyhow::Result<Option<City>> {
        let conn = self.conn.borrow();
        let city = conn
            .query_row(
                "SELECT id, name, latitude, longitude FROM cities WHERE name = ?1",
                params![name],
                city_from_row,
            )
            .optional()?;
        Ok(city)
    }

    // ───────────────────── Ponding points ─────────────────────

    /// Points of a city, ordered by name.
    pub fn query_points(&self, city_name: &str) -> anyhow::Result<Vec<PondingPoint>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(&format!(
            "SELECT {POINT_COLUMNS} FROM ponding_points
             WHERE city_name = ?1
             ORDER BY name, id"
        ))?;
        let rows = stmt
            .query_map(params![city_name], point_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!(
            "query_points({}) returned {} records",
            city_name,
            rows.len()
        );
        Ok(rows)
    }

    pub fn query_point(&self, id: &str) -> anyhow::Result<Option<PondingPoint>> {
        let conn = self.conn.borrow();
        let point = conn
            .query_row(
                &format!("SELECT {POINT_COLUMNS} FROM ponding_points WHERE id = ?1"),
                params![id],
                point_from_row,
            )
            .optional()?;
        Ok(point)
    }

    // ───────────────────── Spells ─────────────────────

    pub fn query_active_spell(&self, city_name: &str) -> anyhow::Result<Option<Spell>> {
        let conn = self.conn.borrow();
        let spell = conn
            .query_row(
                &format!(
                    "SELECT {SPELL_COLUMNS} FROM spells
                     WHERE city_name = ?1 AND status = 'active'
                     LIMIT 1"
                ),
                params![city_name],
                spell_from_row,
            )
            .optional()?;
        spell.map(|s| with_entries(&conn, s)).transpose()
    }

    /// Most recently completed spell of a city, by end time.
    pub fn query_latest_completed_spell(&self, city_name: &str) -> anyhow::Result<Option<Spell>> {
        let conn = self.conn.borrow();
        let spell = conn
            .query_row(
                &format!(
                    "SELECT {SPELL_COLUMNS} FROM spells
                     WHERE city_name = ?1 AND status = 'completed'
                     ORDER BY end_time DESC
                     LIMIT 1"
                ),
                params![city_name],
                spell_from_row,
            )
            .optional()?;
        let spell = spell.map(|s| with_entries(&conn, s)).transpose()?;
        log::debug!(
            "query_latest_completed_spell({}) found {}",
            city_name,
            spell.as_ref().map(|s| s.id.as_str()).unwrap_or("nothing")
        );
        Ok(spell)
    }

    // ───────────────────── Access requests ─────────────────────

    pub fn query_pending_request(&self, email: &str) -> anyhow::Result<Option<AccessRequest>> {
        let conn = self.conn.borrow();
        let request = conn
            .query_row(
                &format!(
                    "SELECT {REQUEST_COLUMNS} FROM access_requests
                     WHERE email = ?1 AND status = 'pending'
                     LIMIT 1"
                ),
                params![email],
                request_from_row,
            )
            .optional()?;
        Ok(request)
    }

    /// Pending requests, oldest first.
    pub fn query_pending_requests(&self) -> anyhow::Result<Vec<AccessRequest>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(&format!(
            "SELECT {REQUEST_COLUMNS} FROM access_requests
             WHERE status = 'pending'
             ORDER BY requested_at"
        ))?;
        let rows = stmt
            .query_map([], request_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!(
            "query_pending_requests returned {} records",
            rows.len()
        );
        Ok(rows)
    }
}

fn with_entries(conn: &Connection, mut spell: Spell) -> anyhow::Result<Spell> {
    let mut stmt = conn.prepare(
        "SELECT point_id, point_name, total_rainfall, ponding_level, cleared_in_time
         FROM spell_entries
         WHERE spell_id = ?1
         ORDER BY position",
    )?;
    spell.spell_data = stmt
        .query_map(params![spell.id], |row| {
            Ok(SpellDataEntry {
                point_id: row.get(0)?,
                point_name: row.get(1)?,
                total_rainfall: row.get(2)?,
                ponding_level: row.get(3)?,
                cleared_in_time: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(spell)
}

fn city_from_row(row: &Row<'_>) -> rusqlite::Result<City> {
    Ok(City {
        id: row.get(0)?,
        name: row.get(1)?,
        latitude: row.get(2)?,
        longitude: row.get(3)?,
    })
}

fn point_from_row(row: &Row<'_>) -> rusqlite::Result<PondingPoint> {
    Ok(PondingPoint {
        id: row.get(0)?,
        name: row.get(1)?,
        city_name: row.get(2)?,
        current_spell: row.get(3)?,
        max_spell_rainfall: row.get(4)?,
        cleared_in_time: row.get(5)?,
        ponding: row.get(6)?,
        is_raining: row.get(7)?,
        daily_max_spell: row.get(8)?,
        updated_at: optional_timestamp(row, 9)?,
    })
}

fn spell_from_row(row: &Row<'_>) -> rusqlite::Result<Spell> {
    Ok(Spell {
        id: row.get(0)?,
        city_name: row.get(1)?,
        start_time: timestamp(row, 2)?,
        end_time: optional_timestamp(row, 3)?,
        status: parsed(row, 4)?,
        spell_data: Vec::new(),
    })
}

fn request_from_row(row: &Row<'_>) -> rusqlite::Result<AccessRequest> {
    Ok(AccessRequest {
        id: row.get(0)?,
        email: row.get(1)?,
        role: parsed(row, 2)?,
        assigned_city: row.get(3)?,
        status: parsed(row, 4)?,
        requested_at: timestamp(row, 5)?,
    })
}

fn conversion_error(idx: usize, err: anyhow::Error) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, err.into())
}

fn timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    parse_timestamp(&text).map_err(|e| conversion_error(idx, e))
}

fn optional_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let text: Option<String> = row.get(idx)?;
    text.map(|t| parse_timestamp(&t).map_err(|e| conversion_error(idx, e)))
        .transpose()
}

fn parsed<T: FromStr<Err = anyhow::Error>>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let text: String = row.get(idx)?;
    text.parse().map_err(|e| conversion_error(idx, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupt_timestamp_is_a_query_error() {
        let db = Database::new().unwrap();
        db.conn
            .borrow()
            .execute(
                "INSERT INTO spells (id, city_name, start_time, status) VALUES ('s', 'Lahore', 'noon', 'active')",
                [],
            )
            .unwrap();
        assert!(db.query_active_spell("Lahore").is_err());
    }

    #[test]
    fn latest_completed_orders_by_end_time() {
        let db = Database::new().unwrap();
        {
            let conn = db.conn.borrow();
            conn.execute_batch(
                "INSERT INTO spells (id, city_name, start_time, end_time, status) VALUES
                   ('old', 'Lahore', '2024-07-01T08:00:00.000Z', '2024-07-01T12:00:00.000Z', 'completed'),
                   ('new', 'Lahore', '2024-07-10T08:00:00.000Z', '2024-07-10T09:30:00.000Z', 'completed'),
                   ('mid', 'Lahore', '2024-07-05T08:00:00.000Z', '2024-07-05T20:00:00.000Z', 'completed'),
                   ('run', 'Lahore', '2024-07-12T08:00:00.000Z', NULL, 'active'),
                   ('mul', 'Multan', '2024-07-11T08:00:00.000Z', '2024-07-11T10:00:00.000Z', 'completed');
                 INSERT INTO spell_entries VALUES
                   ('new', 1, 'b', 'Bhati Gate', 3.0, 0.0, '00:30'),
                   ('new', 0, 'a', 'Anarkali', 5.0, 2.0, '');",
            )
            .unwrap();
        }

        let latest = db.query_latest_completed_spell("Lahore").unwrap().unwrap();
        assert_eq!(latest.id, "new");
        let names: Vec<&str> = latest
            .spell_data
            .iter()
            .map(|e| e.point_name.as_str())
            .collect();
        assert_eq!(names, ["Anarkali", "Bhati Gate"]);

        assert!(db.query_latest_completed_spell("Okara").unwrap().is_none());
    }

    #[test]
    fn pending_requests_oldest_first() {
        let db = Database::new().unwrap();
        db.conn
            .borrow()
            .execute_batch(
                "INSERT INTO access_requests VALUES
                   ('r2', 'b@x.pk', 'viewer', NULL, 'pending', '2024-07-02T00:00:00.000Z'),
                   ('r1', 'a@x.pk', 'city-user', 'Lahore', 'pending', '2024-07-01T00:00:00.000Z'),
                   ('r0', 'c@x.pk', 'viewer', NULL, 'approved', '2024-06-01T00:00:00.000Z');",
            )
            .unwrap();
        let pending = db.query_pending_requests().unwrap();
        let ids: Vec<&str> = pending.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["r1", "r2"]);
        assert_eq!(pending[0].assigned_city.as_deref(), Some("Lahore"));
        assert!(db.query_pending_request("c@x.pk").unwrap().is_none());
    }
}
