//! Connection pool creation and configuration.

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Path that selects a private in-memory database per connection.
pub const MEMORY_PATH: &str = ":memory:";

/// Where the database lives and how its connections behave.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbSettings {
    /// SQLite database file, or [`MEMORY_PATH`].
    pub path: String,

    /// How long a connection waits on a locked database before failing.
    pub busy_timeout: Duration,

    /// Maximum number of pooled SQLite connections.
    pub pool_max_size: u32,
}

impl DbSettings {
    /// Settings for `path` with a 5 second busy timeout and 8 connections.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            busy_timeout: Duration::from_secs(5),
            pool_max_size: 8,
        }
    }

    fn is_memory(&self) -> bool {
        self.path == MEMORY_PATH
    }
}

/// A type alias for the SQLite connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Errors that can occur when creating the database pool.
#[derive(Debug, Error)]
pub enum PoolError {
    /// The directory that should hold the database file could not be created.
    #[error("failed to create database directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to build the connection pool.
    #[error("failed to create database connection pool: {0}")]
    PoolInit(#[from] r2d2::Error),
}

/// Opens the pool described by `settings`.
///
/// Missing parent directories of a file database are created first. Every
/// connection runs in WAL mode with foreign keys enforced. With
/// [`MEMORY_PATH`] each pooled connection gets its own private database, so
/// tests that go through the pool should point at a temporary file instead.
///
/// # Errors
///
/// Returns `PoolError::CreateDir` if the database directory cannot be
/// created, or `PoolError::PoolInit` if no connection can be opened.
pub fn create_pool(settings: &DbSettings) -> Result<DbPool, PoolError> {
    let manager = if settings.is_memory() {
        SqliteConnectionManager::memory()
    } else {
        ensure_parent_dir(Path::new(&settings.path))?;
        SqliteConnectionManager::file(&settings.path)
    };

    let busy_timeout = settings.busy_timeout;
    let manager = manager
        .with_flags(
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_FULL_MUTEX,
        )
        .with_init(move |conn| configure_connection(conn, busy_timeout));

    let pool = Pool::builder()
        .max_size(settings.pool_max_size)
        .build(manager)?;

    tracing::debug!(
        path = %settings.path,
        max_size = settings.pool_max_size,
        busy_timeout_ms = busy_timeout.as_millis() as u64,
        "database pool created"
    );

    Ok(pool)
}

fn configure_connection(conn: &mut Connection, busy_timeout: Duration) -> rusqlite::Result<()> {
    let journal_mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    // In-memory databases stay in "memory" mode.
    if !journal_mode.eq_ignore_ascii_case("wal") && journal_mode != "memory" {
        return Err(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
            Some(format!("journal_mode is {journal_mode}, expected wal")),
        ));
    }
    conn.pragma_update(None, "foreign_keys", true)?;
    conn.busy_timeout(busy_timeout)
}

fn ensure_parent_dir(path: &Path) -> Result<(), PoolError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|source| PoolError::CreateDir {
                path: parent.display().to_string(),
                source,
            })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pragma_i64(conn: &Connection, pragma: &str) -> i64 {
        conn.query_row(&format!("PRAGMA {pragma};"), [], |row| row.get(0))
            .expect("should query pragma")
    }

    #[test]
    fn file_backed_pool_applies_settings() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let settings = DbSettings {
            path: dir.path().join("pool.db").display().to_string(),
            busy_timeout: Duration::from_millis(2_500),
            pool_max_size: 3,
        };

        let pool = create_pool(&settings).expect("pool creation should succeed");
        let conn = pool.get().expect("should get a connection");

        let mode: String = conn
            .query_row("PRAGMA journal_mode;", [], |row| row.get(0))
            .expect("should query journal_mode");
        assert_eq!(mode, "wal");
        assert_eq!(pragma_i64(&conn, "foreign_keys"), 1);
        assert_eq!(pragma_i64(&conn, "busy_timeout"), 2_500);
        assert_eq!(pool.max_size(), 3);
    }

    #[test]
    fn missing_parent_directories_are_created() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let nested = dir.path().join("var").join("lib").join("barbuddy.db");

        let pool = create_pool(&DbSettings::new(nested.display().to_string()))
            .expect("pool creation should succeed");
        drop(pool.get().expect("should get a connection"));

        assert!(nested.exists(), "database file should be created");
    }

    #[test]
    fn parent_that_is_a_file_is_an_error() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"").expect("should write file");

        let result = create_pool(&DbSettings::new(
            blocker.join("bar.db").display().to_string(),
        ));
        assert!(matches!(result, Err(PoolError::CreateDir { .. })));
    }

    #[test]
    fn in_memory_pool_reports_memory_journal() {
        let settings = DbSettings {
            pool_max_size: 1,
            ..DbSettings::new(MEMORY_PATH)
        };
        let pool = create_pool(&settings).expect("pool creation should succeed");
        let conn = pool.get().expect("should get a connection");

        let mode: String = conn
            .query_row("PRAGMA journal_mode;", [], |row| row.get(0))
            .expect("should query journal_mode");
        assert_eq!(mode, "memory");
        assert_eq!(pragma_i64(&conn, "foreign_keys"), 1);
    }
}
