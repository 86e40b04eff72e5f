//! Database layer for BarBuddy.
//!
//! Provides SQLite connection pooling (via `r2d2`), WAL-mode initialization,
//! embedded SQL migrations, and the per-request transaction scope used by
//! every HTTP handler. Tables are only ever created through the versioned
//! migrations in this crate.

mod migrations;
mod pool;
mod session;

pub use migrations::{run_migrations, MigrationError};
pub use pool::{create_pool, DbPool, DbSettings, PoolError, MEMORY_PATH};
pub use session::{run_in_transaction, SessionError};
