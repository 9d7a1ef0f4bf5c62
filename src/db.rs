//! Database connection management, migrations, and error types.
//!
//! This module handles SQLite connection setup (WAL mode, busy timeout),
//! schema versioning via embedded migrations, the process-wide [`Store`]
//! handle shared by request handlers, and the unified error type for the
//! crate.

use rusqlite::Connection;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Central error type for the wiki.
#[derive(Debug, Error)]
pub enum WikiError {
    /// Database operation failed (open, prepare, execute, or commit).
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No revision exists for the requested page (and version).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input provided by the user or caller.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The shared connection could not be used (poisoned lock, failed worker).
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl WikiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, WikiError::NotFound(_))
    }
}

/// Creates the parent directory of `path` if it doesn't exist.
pub fn ensure_parent_dir(path: &Path) -> Result<(), WikiError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Opens a SQLite connection at the specified path with proper settings.
///
/// - **WAL mode**: concurrent readers with a serialized writer
/// - **Busy timeout**: 5 seconds to ride out write contention
///
/// Creates the parent directory first.
///
/// # Errors
///
/// Returns `WikiError::Io` if the directory cannot be created, `WikiError::Db`
/// if the connection cannot be opened or configured.
///
/// # Examples
///
/// ```no_run
/// use wiki::db::open_connection_at;
/// use std::path::Path;
///
/// let conn = open_connection_at(Path::new("/tmp/wiki.db"))
///     .expect("Failed to open connection");
/// ```
pub fn open_connection_at(path: &Path) -> Result<Connection, WikiError> {
    ensure_parent_dir(path)?;
    let conn = Connection::open(path)?;

    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.busy_timeout(std::time::Duration::from_secs(5))?;

    Ok(conn)
}

/// Runs all pending database migrations.
///
/// Reads the current version from `schema_meta` (0 if the table doesn't
/// exist yet) and applies every embedded migration above it, each in its own
/// transaction. Migrations use `IF NOT EXISTS`, so a database created by an
/// older deployment with a bare `pages` table is adopted as-is.
pub fn run_migrations(conn: &mut Connection) -> Result<(), WikiError> {
    let current_version: i64 = conn
        .query_row("SELECT version FROM schema_meta LIMIT 1", [], |row| row.get(0))
        .unwrap_or(0);

    let migrations: Vec<(i64, &str)> = vec![(1, include_str!("../migrations/001_pages.sql"))];

    for (target_version, sql) in migrations {
        if target_version > current_version {
            let tx = conn.transaction()?;
            tx.execute_batch(sql)?;
            tx.commit()?;
            tracing::debug!(version = target_version, "Applied migration");
        }
    }

    Ok(())
}

/// Process-wide handle to the page store.
///
/// Opened once at startup and handed to the server state. Cloning is cheap;
/// all clones share one connection, serialized by a mutex.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Wraps an already-configured, already-migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Opens (creating if needed) the database at `path` and migrates it.
    pub fn open_at(path: &Path) -> Result<Self, WikiError> {
        let mut conn = open_connection_at(path)?;
        run_migrations(&mut conn)?;
        Ok(Self::new(conn))
    }

    /// A fresh private in-memory store, used by tests.
    pub fn open_in_memory() -> Result<Self, WikiError> {
        let mut conn = Connection::open_in_memory()?;
        run_migrations(&mut conn)?;
        Ok(Self::new(conn))
    }

    /// Runs `f` against the connection on the current thread.
    pub fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, WikiError>,
    ) -> Result<T, WikiError> {
        let guard = self
            .conn
            .lock()
            .map_err(|e| WikiError::Unavailable(e.to_string()))?;
        f(&guard)
    }

    /// Runs `f` against the connection on tokio's blocking pool.
    ///
    /// The calling request is suspended until the store work completes.
    pub async fn call<T, F>(&self, f: F) -> Result<T, WikiError>
    where
        F: FnOnce(&Connection) -> Result<T, WikiError> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.with_conn(f))
            .await
            .map_err(|e| WikiError::Unavailable(e.to_string()))?
    }
}
