//! Sets up the application's database schema and provides shared helpers for accessing it.

use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{
    Error,
    audit::create_log_table,
    cost::create_cost_table,
    report::create_report_table,
    user::{User, UserId, create_user, create_user_table},
};

/// The ID of the single user that exists after [reset].
pub const DEFAULT_USER_ID: i64 = 123123;

/// Create the tables for the domain models if they do not already exist.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_cost_table(&transaction)?;
    create_report_table(&transaction)?;
    create_log_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Delete all users, costs, logs and cached reports, then insert the default user.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn reset(connection: &Connection) -> Result<User, Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    for table in ["user", "cost", "log", "report"] {
        let deleted_rows = transaction.execute(&format!("DELETE FROM \"{table}\""), ())?;
        tracing::info!("Cleared {deleted_rows} rows from {table}");
    }

    let user = create_user(
        User::build(UserId::new(DEFAULT_USER_ID), "mosh", "israeli", "1990-01-01")?,
        &transaction,
    )?;

    transaction.commit()?;

    Ok(user)
}

/// Acquire the shared database connection.
///
/// # Errors
/// Returns [Error::DatabaseLockError] if the lock has been poisoned.
pub fn lock_connection(connection: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>, Error> {
    connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
}
