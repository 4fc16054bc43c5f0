//! SQL schema definitions for the SQLite store.
//!
//! The schema is applied as a single batch when the database is opened.
//! Timestamps are RFC 3339 UTC text (see `psm_utils::dates::format_timestamp`),
//! which sorts chronologically as plain text.

/// Returns the full SQL schema as a single batch string.
///
/// This creates the following tables:
///
/// - `cities` - City metadata (id, unique name, coordinates)
/// - `ponding_points` - Per-point readings and derived aggregates, keyed by city name
/// - `spells` - Rainfall spells; at most one `active` row per city
/// - `spell_entries` - Archived final readings of a completed spell, one row per point
/// - `access_requests` - Sign-up requests awaiting review
///
/// The partial unique index `idx_spells_one_active` makes "one active spell
/// per city" a database constraint rather than only an application check.
pub fn create_schema() -> &'static str {
    r#"
    CREATE TABLE IF NOT EXISTS cities (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        latitude REAL NOT NULL,
        longitude REAL NOT NULL
    );

    CREATE TABLE IF NOT EXISTS ponding_points (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        city_name TEXT NOT NULL,
        current_spell REAL NOT NULL DEFAULT 0,
        max_spell_rainfall REAL NOT NULL DEFAULT 0,
        cleared_in_time TEXT NOT NULL DEFAULT '',
        ponding REAL NOT NULL DEFAULT 0,
        is_raining INTEGER NOT NULL DEFAULT 0,
        daily_max_spell REAL NOT NULL DEFAULT 0,
        updated_at TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_points_city ON ponding_points(city_name);

    CREATE TABLE IF NOT EXISTS spells (
        id TEXT PRIMARY KEY,
        city_name TEXT NOT NULL,
        start_time TEXT NOT NULL,
        end_time TEXT,
        status TEXT NOT NULL CHECK (status IN ('active', 'completed'))
    );
    CREATE INDEX IF NOT EXISTS idx_spells_city_status ON spells(city_name, status, end_time);
    CREATE UNIQUE INDEX IF NOT EXISTS idx_spells_one_active
        ON spells(city_name) WHERE status = 'active';

    CREATE TABLE IF NOT EXISTS spell_entries (
        spell_id TEXT NOT NULL REFERENCES spells(id),
        position INTEGER NOT NULL,
        point_id TEXT NOT NULL,
        point_name TEXT NOT NULL,
        total_rainfall REAL NOT NULL,
        ponding_level REAL NOT NULL,
        cleared_in_time TEXT NOT NULL,
        PRIMARY KEY (spell_id, position)
    );

    CREATE TABLE IF NOT EXISTS access_requests (
        id TEXT PRIMARY KEY,
        email TEXT NOT NULL,
        role TEXT NOT NULL,
        assigned_city TEXT,
        status TEXT NOT NULL,
        requested_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_requests_email_status ON access_requests(email, status);
    "#
}
