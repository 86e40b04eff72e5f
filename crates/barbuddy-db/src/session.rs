//! Per-request transaction scope.
//!
//! Every handler borrows one pooled connection, opens one `IMMEDIATE`
//! transaction, and commits it exactly once when its work succeeds. The write
//! lock is taken at `BEGIN`, where the busy timeout applies, so a request that
//! reads before it writes never fails a lock upgrade under WAL. Any error from the work
//! closure drops the transaction, which rolls it back, and the connection
//! goes back to the pool on every exit path.

use crate::DbPool;
use rusqlite::{Transaction, TransactionBehavior};
use thiserror::Error;

/// Errors raised by the transaction scope itself (not by the work it runs).
#[derive(Debug, Error)]
pub enum SessionError {
    /// No connection could be checked out of the pool.
    #[error("failed to acquire database connection: {0}")]
    Acquire(#[from] r2d2::Error),

    /// Beginning or committing the transaction failed.
    #[error("database transaction failed: {0}")]
    Transaction(#[from] rusqlite::Error),
}

/// Runs `work` inside a single transaction on a pooled connection.
///
/// The transaction is committed only if `work` returns `Ok`. This is a
/// blocking call; async callers should wrap it in `spawn_blocking`.
///
/// # Errors
///
/// Returns the error from `work` unchanged, or a [`SessionError`] converted
/// into `E` if a connection cannot be acquired or the commit fails.
pub fn run_in_transaction<T, E, F>(pool: &DbPool, work: F) -> Result<T, E>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, E>,
    E: From<SessionError>,
{
    let mut conn = pool.get().map_err(SessionError::from)?;
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(SessionError::from)?;

    let value = work(&tx)?;

    tx.commit().map_err(SessionError::from)?;
    Ok(value)
}
