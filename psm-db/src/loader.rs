//! CSV fixture loading for cities and ponding points.
//!
//! Fixtures seed a fresh database; loading the same file twice is a no-op
//! for rows that already exist. Each file loads in one transaction, so a
//! bad row leaves nothing behind.
//!
//! # CSV Formats
//!
//! - **Cities** (has headers): `NAME,LATITUDE,LONGITUDE`
//! - **Ponding points** (has headers): `CITY,NAME`

use crate::Database;
use psm_core::new_id;
use rusqlite::{params, OptionalExtension};

impl Database {
    /// Load cities from a CSV string. Returns the number of new cities.
    ///
    /// Cities whose name already exists are skipped.
    ///
    /// # Example CSV
    /// ```text
    /// NAME,LATITUDE,LONGITUDE
    /// Lahore,31.5204,74.3587
    /// ```
    pub fn load_cities(&self, csv_data: &str) -> anyhow::Result<usize> {
        let mut conn = self.conn.borrow_mut();
        let tx = conn.transaction()?;
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(csv_data.as_bytes());

        let mut count = 0usize;
        let mut skipped = 0usize;
        for result in rdr.records() {
            let r = result?;
            let name = r.get(0).unwrap_or("").trim();
            if name.is_empty() {
                skipped += 1;
                continue;
            }
            let latitude: f64 = r.get(1).unwrap_or("").trim().parse()?;
            let longitude: f64 = r.get(2).unwrap_or("").trim().parse()?;
            if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
                anyhow::bail!("invalid coordinates for {}: {}, {}", name, latitude, longitude);
            }

            let inserted = tx.execute(
                "INSERT INTO cities (id, name, latitude, longitude)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(name) DO NOTHING",
                params![new_id(), name, latitude, longitude],
            )?;
            if inserted == 0 {
                skipped += 1;
            }
            count += inserted;
        }
        tx.commit()?;
        log::info!("Loaded {} cities, skipped {}", count, skipped);
        Ok(count)
    }

    /// Load ponding points from a CSV string. Returns the number of new points.
    ///
    /// New points start dry with no readings. A point whose name already
    /// exists in the same city is skipped.
    ///
    /// # Example CSV
    /// ```text
    /// CITY,NAME
    /// Lahore,Lakshmi Chowk
    /// ```
    pub fn load_points(&self, csv_data: &str) -> anyhow::Result<usize> {
        let mut conn = self.conn.borrow_mut();
        let tx = conn.transaction()?;
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(csv_data.as_bytes());

        let mut count = 0usize;
        let mut skipped = 0usize;
        for result in rdr.records() {
            let r = result?;
            let city = r.get(0).unwrap_or("").trim();
            let name = r.get(1).unwrap_or("").trim();
            if city.is_empty() || name.is_empty() {
                skipped += 1;
                continue;
            }

            let exists = tx
                .query_row(
                    "SELECT 1 FROM ponding_points WHERE city_name = ?1 AND name = ?2",
                    params![city, name],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();
            if exists {
                skipped += 1;
                continue;
            }

            tx.execute(
                "INSERT INTO ponding_points (id, name, city_name) VALUES (?1, ?2, ?3)",
                params![new_id(), name, city],
            )?;
            count += 1;
        }
        tx.commit()?;
        log::info!("Loaded {} ponding points, skipped {}", count, skipped);
        Ok(count)
    }
}
