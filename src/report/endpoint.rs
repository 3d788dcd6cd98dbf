//! Defines the endpoint for getting a user's monthly report.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State, rejection::QueryRejection},
};
use rusqlite::Connection;
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    audit::AuditLog,
    category::CategoryConfig,
    endpoints,
    report::{MonthKey, MonthlyReport, get_report, store::SQLiteReportStore},
    user::UserId,
};

/// The state needed to get a report.
#[derive(Debug, Clone)]
pub struct ReportState {
    /// The database connection for reading costs and cached reports.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The categories listed in a report and their order.
    pub categories: Arc<CategoryConfig>,
    /// Where endpoint accesses are recorded.
    pub audit_log: AuditLog,
}

impl FromRef<AppState> for ReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            categories: state.categories.clone(),
            audit_log: state.audit_log.clone(),
        }
    }
}

/// The query parameters for a report.
///
/// The parameters are read as text so that a missing or malformed value gives
/// an error naming the parameter.
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    /// The user ID.
    pub id: Option<String>,
    /// The calendar year, 1970 or later.
    pub year: Option<String>,
    /// The calendar month from 1 to 12.
    pub month: Option<String>,
}

impl ReportQuery {
    fn month_key(&self) -> Result<MonthKey, Error> {
        let user_id = parse_param::<i64>(&self.id).ok_or(Error::InvalidUserId)?;
        let year = parse_param::<i32>(&self.year).ok_or(Error::InvalidYear)?;
        let month = parse_param::<u8>(&self.month).ok_or(Error::InvalidMonth)?;

        MonthKey::new(UserId::new(user_id), year, month)
    }
}

fn parse_param<T: std::str::FromStr>(param: &Option<String>) -> Option<T> {
    param.as_deref()?.trim().parse().ok()
}

/// A route handler for getting a user's report for one calendar month.
pub async fn get_report_endpoint(
    State(state): State<ReportState>,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> Result<Json<MonthlyReport>, Error> {
    state.audit_log.endpoint_accessed("GET", endpoints::REPORT);

    let Query(query) = query.map_err(|rejection| Error::InvalidQuery(rejection.body_text()))?;

    let key = query.month_key()?;
    let store = SQLiteReportStore::new(state.db_connection.clone());

    get_report(
        &key,
        OffsetDateTime::now_utc(),
        &state.categories,
        &store,
        &store,
    )
    .map(Json)
}
