//! Defines the endpoint for reading the audit log.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State, rejection::QueryRejection},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    audit::{AuditEntry, AuditLog, MAX_LOG_LIMIT, get_logs},
    db::lock_connection,
    endpoints,
};

/// The state needed to read the audit log.
#[derive(Debug, Clone)]
pub struct LogsState {
    /// The database connection for reading the log table.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Where endpoint accesses are recorded.
    pub audit_log: AuditLog,
}

impl FromRef<AppState> for LogsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            audit_log: state.audit_log.clone(),
        }
    }
}

/// The query parameters for reading the audit log.
#[derive(Debug, Default, Deserialize)]
pub struct LogsQuery {
    /// The most entries to return.
    pub limit: Option<String>,
}

impl LogsQuery {
    /// The limit to apply, capped at [MAX_LOG_LIMIT].
    ///
    /// Missing, non-numeric and non-positive limits mean no limit.
    fn limit(&self) -> Option<u32> {
        let limit = self.limit.as_deref()?.trim().parse::<i64>().ok()?;

        if limit > 0 {
            Some(limit.min(i64::from(MAX_LOG_LIMIT)) as u32)
        } else {
            None
        }
    }
}

/// A route handler for listing audit log entries, newest first.
pub async fn get_logs_endpoint(
    State(state): State<LogsState>,
    query: Result<Query<LogsQuery>, QueryRejection>,
) -> Result<Json<Vec<AuditEntry>>, Error> {
    let Query(query) = query.map_err(|rejection| Error::InvalidQuery(rejection.body_text()))?;

    let logs = {
        let connection = lock_connection(&state.db_connection)?;
        get_logs(query.limit(), &connection)?
    };

    // Recorded after reading so the response does not include its own entry.
    state.audit_log.endpoint_accessed("GET", endpoints::LOGS);

    Ok(Json(logs))
}

#[cfg(test)]
mod logs_endpoint_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use time::{Duration, macros::datetime};

    use crate::{
        audit::{AuditEntry, LogLevel, endpoint::LogsQuery, insert_log},
        build_router,
        db::lock_connection,
        endpoints,
        test_utils::get_test_app_state,
    };

    fn query(limit: &str) -> LogsQuery {
        LogsQuery {
            limit: Some(limit.to_owned()),
        }
    }

    #[test]
    fn limit_is_capped() {
        assert_eq!(query("10").limit(), Some(10));
        assert_eq!(query("5000").limit(), Some(5000));
        assert_eq!(query("5001").limit(), Some(5000));
        assert_eq!(query("99999999999").limit(), Some(5000));
    }

    #[test]
    fn invalid_limit_means_no_limit() {
        assert_eq!(LogsQuery::default().limit(), None);
        assert_eq!(query("abc").limit(), None);
        assert_eq!(query("0").limit(), None);
        assert_eq!(query("-3").limit(), None);
    }

    #[tokio::test]
    async fn get_logs_newest_first_with_limit() {
        let state = get_test_app_state();
        {
            let connection = lock_connection(&state.db_connection).unwrap();
            let start = datetime!(2025-11-17 00:00 UTC);

            for i in 0..3 {
                let mut entry = AuditEntry::new("logs-service", LogLevel::Info, format!("Test log {i}"));
                entry.timestamp = start + Duration::minutes(i);
                insert_log(&entry, &connection).unwrap();
            }
        }
        let server = TestServer::try_new(build_router(state)).expect("Could not create test server.");

        let response = server
            .get(endpoints::LOGS)
            .add_query_param("limit", 2)
            .await;

        response.assert_status_ok();
        let logs = response.json::<serde_json::Value>();
        assert_eq!(logs.as_array().unwrap().len(), 2);
        assert_eq!(logs[0]["message"], "Test log 2");
        assert_eq!(logs[1]["message"], "Test log 1");
        assert_eq!(logs[0]["service"], "logs-service");
        assert_eq!(logs[0]["level"], "info");
        assert_eq!(logs[0]["timestamp"], "2025-11-17T00:02:00Z");
    }

    #[tokio::test]
    async fn get_logs_from_empty_log() {
        let server = TestServer::try_new(build_router(get_test_app_state()))
            .expect("Could not create test server.");

        let response = server.get(endpoints::LOGS).await;

        response.assert_status_ok();
        assert_eq!(response.json::<serde_json::Value>(), serde_json::json!([]));
    }

    #[tokio::test]
    async fn get_logs_with_repeated_limit_is_bad_request() {
        let server = TestServer::try_new(build_router(get_test_app_state()))
            .expect("Could not create test server.");

        let response = server.get("/api/logs?limit=1&limit=2").await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<serde_json::Value>()["id"], "INVALID_QUERY");
    }
}
