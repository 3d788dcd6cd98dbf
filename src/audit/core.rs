//! Defines the audit log entry and the database queries for the log table.

use std::{fmt::Display, str::FromStr};

use rusqlite::{Connection, Row, types::Type};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    timestamp::{get_timestamp, to_unix_micros},
};

/// The most entries that can be requested from the log at once.
pub const MAX_LOG_LIMIT: u32 = 5000;

/// The severity of an audit log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Normal operation.
    Info,
    /// Something unexpected that did not stop the request.
    Warn,
    /// A failed operation.
    Error,
}

impl LogLevel {
    /// The lowercase name stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("\"{other}\" is not a log level")),
        }
    }
}

/// A record of something the service did, kept in the log table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the entry was created.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// The name of the service that created the entry.
    pub service: String,
    /// The severity of the entry.
    pub level: LogLevel,
    /// What happened.
    pub message: String,
    /// The ID given to the request by the audit middleware.
    pub request_id: Option<String>,
    /// The HTTP method of the request.
    pub method: Option<String>,
    /// The path and query of the request.
    pub path: Option<String>,
    /// The HTTP status code of the response.
    pub status_code: Option<u16>,
    /// How long the request took to handle in milliseconds.
    pub response_time_ms: Option<u32>,
}

impl AuditEntry {
    /// Create an entry with only the required fields set.
    pub fn new(service: &str, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: OffsetDateTime::now_utc(),
            service: service.to_owned(),
            level,
            message: message.into(),
            request_id: None,
            method: None,
            path: None,
            status_code: None,
            response_time_ms: None,
        }
    }
}

/// Create the log table.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_log_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp INTEGER NOT NULL,
                service TEXT NOT NULL,
                level TEXT NOT NULL,
                message TEXT NOT NULL,
                request_id TEXT,
                method TEXT,
                path TEXT,
                status_code INTEGER,
                response_time_ms INTEGER
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_log_timestamp ON log(timestamp);",
        (),
    )?;

    Ok(())
}

/// Add `entry` to the log table.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn insert_log(entry: &AuditEntry, connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO log (timestamp, service, level, message, request_id, method, path, status_code, response_time_ms)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        (
            to_unix_micros(entry.timestamp),
            &entry.service,
            entry.level.as_str(),
            &entry.message,
            &entry.request_id,
            &entry.method,
            &entry.path,
            entry.status_code,
            entry.response_time_ms,
        ),
    )?;

    Ok(())
}

/// Get log entries, newest first.
///
/// At most `limit` entries are returned, or every entry if `limit` is `None`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_logs(limit: Option<u32>, connection: &Connection) -> Result<Vec<AuditEntry>, Error> {
    // A negative limit means no limit in SQLite.
    let limit = limit.map_or(-1, i64::from);

    connection
        .prepare(
            "SELECT timestamp, service, level, message, request_id, method, path, status_code, response_time_ms
             FROM log
             ORDER BY timestamp DESC, id DESC
             LIMIT ?1",
        )?
        .query_map((limit,), map_log_row)?
        .map(|maybe_entry| maybe_entry.map_err(|error| error.into()))
        .collect()
}

fn map_log_row(row: &Row) -> Result<AuditEntry, rusqlite::Error> {
    let raw_level: String = row.get(2)?;
    let level = raw_level.parse().map_err(|error: String| {
        rusqlite::Error::FromSqlConversionFailure(2, Type::Text, error.into())
    })?;

    Ok(AuditEntry {
        timestamp: get_timestamp(row, 0)?,
        service: row.get(1)?,
        level,
        message: row.get(3)?,
        request_id: row.get(4)?,
        method: row.get(5)?,
        path: row.get(6)?,
        status_code: row.get(7)?,
        response_time_ms: row.get(8)?,
    })
}

#[cfg(test)]
mod log_query_tests {
    use rusqlite::Connection;
    use time::{Duration, macros::datetime};

    use crate::audit::{AuditEntry, LogLevel, create_log_table, get_logs, insert_log};

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        create_log_table(&connection).expect("Could not create log table");
        connection
    }

    fn insert_entries(count: i64, connection: &Connection) {
        let start = datetime!(2025-11-17 00:00 UTC);

        for i in 0..count {
            let mut entry = AuditEntry::new("costs-service", LogLevel::Info, format!("entry {i}"));
            entry.timestamp = start + Duration::minutes(i);
            insert_log(&entry, connection).expect("Could not insert log entry");
        }
    }

    #[test]
    fn insert_then_get() {
        let connection = get_test_connection();
        let entry = AuditEntry {
            timestamp: datetime!(2025-11-17 08:30:00.25 UTC),
            service: "costs-service".to_owned(),
            level: LogLevel::Warn,
            message: "HTTP request".to_owned(),
            request_id: Some("8d0e8a6e-6c2f-4c38-9a7e-2f7f0f0a1b2c".to_owned()),
            method: Some("GET".to_owned()),
            path: Some("/api/report?id=1&year=2025&month=11".to_owned()),
            status_code: Some(200),
            response_time_ms: Some(3),
        };
        insert_log(&entry, &connection).expect("Could not insert log entry");

        let logs = get_logs(None, &connection);

        assert_eq!(logs, Ok(vec![entry]));
    }

    #[test]
    fn get_returns_newest_first() {
        let connection = get_test_connection();
        insert_entries(3, &connection);

        let messages: Vec<String> = get_logs(None, &connection)
            .unwrap()
            .into_iter()
            .map(|entry| entry.message)
            .collect();

        assert_eq!(messages, vec!["entry 2", "entry 1", "entry 0"]);
    }

    #[test]
    fn get_respects_limit() {
        let connection = get_test_connection();
        insert_entries(5, &connection);

        let logs = get_logs(Some(2), &connection).unwrap();

        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].message, "entry 4");
    }

    #[test]
    fn get_from_empty_table() {
        let connection = get_test_connection();

        assert_eq!(get_logs(Some(10), &connection), Ok(Vec::new()));
    }
}
