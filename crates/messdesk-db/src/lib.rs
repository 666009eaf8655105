//! SQLite persistence for the grievance backend: one shared connection
//! behind a mutex, schema applied on open, typed row structs in [`models`]
//! and the query layer in [`queries`].

pub mod migrations;
pub mod models;
pub mod queries;

use anyhow::Result;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

/// Handle over a single SQLite connection. Every query takes the lock for
/// the duration of its statements, so multi-statement sequences inside one
/// [`Database::with_conn`] closure observe no interleaved writes.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        // WAL lets readers proceed while a write holds the lock.
        conn.pragma_update(None, "journal_mode", "WAL")?;
        let db = Self::finish(conn)?;
        info!("grievance store ready at {}", path.display());
        Ok(db)
    }

    /// In-memory store for tests. WAL is skipped, it has no effect there.
    pub fn open_in_memory() -> Result<Self> {
        Self::finish(Connection::open_in_memory()?)
    }

    fn finish(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrations::run(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("connection mutex poisoned by a panicked writer: {e}"))?;
        f(&conn)
    }
}

/// Whether `err` wraps a SQLite constraint failure (UNIQUE, CHECK, FK)
/// rather than an operational fault. Lets callers answer a lost race on a
/// unique column as a duplicate record instead of a server error.
pub fn is_constraint_violation(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<rusqlite::Error>(),
        Some(rusqlite::Error::SqliteFailure(f, _))
            if f.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
