//! Records audit entries to the console and the log table.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use tokio::task::JoinHandle;

use crate::{
    audit::{AuditEntry, LogLevel, insert_log},
    db::lock_connection,
};

/// Writes audit entries for one service.
///
/// Writing to the log table never blocks or fails the request that created
/// the entry. Failed writes are reported through `tracing` only.
#[derive(Debug, Clone)]
pub struct AuditLog {
    service: Arc<str>,
    db_connection: Arc<Mutex<Connection>>,
}

impl AuditLog {
    /// Create an audit log that tags entries with `service`.
    pub fn new(service: &str, db_connection: Arc<Mutex<Connection>>) -> Self {
        Self {
            service: Arc::from(service),
            db_connection,
        }
    }

    /// The service name added to each entry.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Log `entry` and write it to the log table in the background.
    ///
    /// The returned handle completes once the write has finished. Callers do
    /// not need to wait on it.
    pub fn record(&self, entry: AuditEntry) -> JoinHandle<()> {
        match entry.level {
            LogLevel::Info => tracing::info!(
                service = %entry.service,
                request_id = entry.request_id.as_deref(),
                method = entry.method.as_deref(),
                path = entry.path.as_deref(),
                status_code = entry.status_code,
                response_time_ms = entry.response_time_ms,
                "{}",
                entry.message
            ),
            LogLevel::Warn => tracing::warn!(
                service = %entry.service,
                request_id = entry.request_id.as_deref(),
                method = entry.method.as_deref(),
                path = entry.path.as_deref(),
                status_code = entry.status_code,
                response_time_ms = entry.response_time_ms,
                "{}",
                entry.message
            ),
            LogLevel::Error => tracing::error!(
                service = %entry.service,
                request_id = entry.request_id.as_deref(),
                method = entry.method.as_deref(),
                path = entry.path.as_deref(),
                status_code = entry.status_code,
                response_time_ms = entry.response_time_ms,
                "{}",
                entry.message
            ),
        }

        let db_connection = self.db_connection.clone();

        tokio::task::spawn_blocking(move || {
            let result = lock_connection(&db_connection)
                .and_then(|connection| insert_log(&entry, &connection));

            if let Err(error) = result {
                tracing::error!("could not write audit log entry: {error}");
            }
        })
    }

    /// Record that the endpoint at `path` was called with `method`.
    pub fn endpoint_accessed(&self, method: &str, path: &str) -> JoinHandle<()> {
        let mut entry = AuditEntry::new(
            &self.service,
            LogLevel::Info,
            format!("Endpoint accessed: {method} {path}"),
        );
        entry.method = Some(method.to_owned());
        entry.path = Some(path.to_owned());

        self.record(entry)
    }
}

#[cfg(test)]
mod audit_log_tests {
    use std::{
        io,
        sync::{Arc, Mutex},
    };

    use rusqlite::Connection;

    use crate::{
        audit::{AuditEntry, AuditLog, LogLevel, create_log_table, get_logs},
        db::lock_connection,
    };

    fn get_test_audit_log() -> AuditLog {
        let connection = Connection::open_in_memory().unwrap();
        create_log_table(&connection).unwrap();
        AuditLog::new("costs-service", Arc::new(Mutex::new(connection)))
    }

    #[tokio::test]
    async fn record_writes_entry() {
        let audit_log = get_test_audit_log();
        let entry = AuditEntry::new(audit_log.service(), LogLevel::Error, "something broke");

        audit_log
            .record(entry.clone())
            .await
            .expect("Could not join log writer");

        let connection = lock_connection(&audit_log.db_connection).unwrap();
        assert_eq!(get_logs(None, &connection), Ok(vec![entry]));
    }

    #[derive(Clone, Default)]
    struct CapturedOutput(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedOutput {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn every_level_logs_status_and_response_time() {
        let audit_log = get_test_audit_log();

        for level in [LogLevel::Info, LogLevel::Warn, LogLevel::Error] {
            let output = CapturedOutput::default();
            let writer = output.clone();
            let subscriber = tracing_subscriber::fmt()
                .with_writer(move || writer.clone())
                .with_ansi(false)
                .finish();
            let mut entry = AuditEntry::new(audit_log.service(), level, "HTTP request");
            entry.status_code = Some(503);
            entry.response_time_ms = Some(42);

            let handle = tracing::subscriber::with_default(subscriber, || audit_log.record(entry));
            handle.await.expect("Could not join log writer");

            let logged = String::from_utf8(output.0.lock().unwrap().clone()).unwrap();
            assert!(logged.contains("status_code=503"), "{level}: {logged}");
            assert!(logged.contains("response_time_ms=42"), "{level}: {logged}");
        }
    }

    #[tokio::test]
    async fn endpoint_accessed_describes_endpoint() {
        let audit_log = get_test_audit_log();

        audit_log
            .endpoint_accessed("GET", "/api/report")
            .await
            .expect("Could not join log writer");

        let connection = lock_connection(&audit_log.db_connection).unwrap();
        let logs = get_logs(None, &connection).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].message, "Endpoint accessed: GET /api/report");
        assert_eq!(logs[0].service, "costs-service");
        assert_eq!(logs[0].level, LogLevel::Info);
        assert_eq!(logs[0].method.as_deref(), Some("GET"));
        assert_eq!(logs[0].path.as_deref(), Some("/api/report"));
    }

    #[tokio::test]
    async fn failed_write_does_not_panic() {
        // No log table, so the insert fails.
        let audit_log = AuditLog::new(
            "costs-service",
            Arc::new(Mutex::new(Connection::open_in_memory().unwrap())),
        );

        let result = audit_log.endpoint_accessed("GET", "/api/logs").await;

        assert!(result.is_ok());
    }
}
