//! The database table that holds the reports for closed months.

use rusqlite::{Connection, OptionalExtension, Row, types::Type};
use time::OffsetDateTime;

use crate::{
    Error,
    report::{CachedReport, CategoryItems, MonthKey, MonthlyReport},
    timestamp::{get_timestamp, to_unix_micros},
    user::UserId,
};

/// Create the report table.
///
/// A report is written at most once per (user, year, month); the unique
/// constraint is what settles concurrent attempts to cache the same month.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_report_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS report (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                year INTEGER NOT NULL,
                month INTEGER NOT NULL,
                costs TEXT NOT NULL,
                computed_at INTEGER NOT NULL,
                UNIQUE(user_id, year, month)
                )",
        (),
    )?;

    Ok(())
}

/// Get the cached report for `key`, if there is one.
///
/// # Errors
/// Returns a [Error::SqlError] if there is an SQL error or if the stored
/// costs are not valid report JSON.
pub fn find_report(key: &MonthKey, connection: &Connection) -> Result<Option<CachedReport>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, year, month, costs, computed_at
             FROM report
             WHERE user_id = ?1 AND year = ?2 AND month = ?3",
        )?
        .query_row(
            (key.user_id().as_i64(), key.year(), key.month_number()),
            map_report_row,
        )
        .optional()
        .map_err(|error| error.into())
}

/// Save `report` as the report for its month.
///
/// Existing reports are never replaced.
///
/// # Errors
/// Returns a [Error::DuplicateReport] if a report for the same month has
/// already been saved, or a [Error::SqlError] if there is some other SQL error.
pub fn insert_report(
    key: &MonthKey,
    report: &MonthlyReport,
    computed_at: OffsetDateTime,
    connection: &Connection,
) -> Result<CachedReport, Error> {
    let costs = serde_json::to_string(&report.categorized_items)
        .map_err(|error| rusqlite::Error::ToSqlConversionFailure(Box::new(error)))?;

    connection
        .prepare(
            "INSERT INTO report (user_id, year, month, costs, computed_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, user_id, year, month, costs, computed_at",
        )?
        .query_row(
            (
                key.user_id().as_i64(),
                key.year(),
                key.month_number(),
                costs,
                to_unix_micros(computed_at),
            ),
            map_report_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateReport(*key),
            error => error.into(),
        })
}

fn map_report_row(row: &Row) -> Result<CachedReport, rusqlite::Error> {
    let raw_costs: String = row.get(4)?;
    let categorized_items: Vec<CategoryItems> = serde_json::from_str(&raw_costs)
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(error)))?;

    Ok(CachedReport {
        id: row.get(0)?,
        report: MonthlyReport {
            user_id: UserId::new(row.get(1)?),
            year: row.get(2)?,
            month: row.get(3)?,
            categorized_items,
        },
        computed_at: get_timestamp(row, 5)?,
    })
}
