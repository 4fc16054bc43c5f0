//! SQLite store for spell and ponding monitoring data.
//!
//! This crate implements [`psm_core::MonitorStore`] on top of `rusqlite`.
//! The same [`Database`] handle serves an in-memory database (tests,
//! throwaway sessions) or a file on disk (the CLI).
//!
//! # Architecture
//!
//! - `Rc<RefCell<Connection>>` wrapper: one connection per process, shared by
//!   the services of a single request
//! - Typed query methods returning `psm_core` records
//! - Every write goes through one SQLite transaction per
//!   [`psm_core::WriteBatch`], so batches are all-or-nothing
//! - CSV fixtures for cities and ponding points loaded via the `load_*` methods
//!
//! # Usage
//!
//! ```rust
//! use chrono::Utc;
//! use psm_core::SpellLifecycle;
//! use psm_db::Database;
//!
//! let db = Database::new().unwrap();
//! db.load_points("CITY,NAME\nLahore,Mall Road\n").unwrap();
//!
//! let lifecycle = SpellLifecycle::new(&db);
//! lifecycle.start_spell("Lahore", Utc::now()).unwrap();
//! let spell = lifecycle.stop_spell("Lahore", Utc::now()).unwrap();
//! assert_eq!(spell.spell_data.len(), 1);
//! ```
//!
//! # Tables
//!
//! See [`schema::create_schema`] for the full SQL schema.

pub mod schema;
mod loader;
mod queries;
mod writes;

use rusqlite::Connection;
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

/// Path that selects an in-memory database in [`Database::open`].
pub const IN_MEMORY: &str = ":memory:";

/// SQLite database holding cities, ponding points, spells and access requests.
///
/// This struct is cheaply cloneable (via `Rc`); clones share one connection.
#[derive(Clone)]
pub struct Database {
    conn: Rc<RefCell<Connection>>,
}

impl Database {
    /// Create a new in-memory database with the full schema applied.
    pub fn new() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    /// Open (or create) the database at `path`, applying the schema.
    ///
    /// `":memory:"` opens an in-memory database.
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if path.as_os_str() == IN_MEMORY {
            return Self::new();
        }
        let conn = Connection::open(path)?;
        log::info!("Opened database {}", path.display());
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> anyhow::Result<Self> {
        conn.execute_batch(schema::create_schema())?;
        Ok(Self {
            conn: Rc::new(RefCell::new(conn)),
        })
    }
}
