//! The storage the report gate reads from and writes to.

use std::{
    ops::Range,
    sync::{Arc, Mutex},
};

use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    Error,
    cost::{CostEntry, get_costs_in_range},
    db::lock_connection,
    report::{
        CachedReport, MonthKey, MonthlyReport,
        cache::{find_report, insert_report},
    },
    user::UserId,
};

/// Reads the costs that make up a report.
pub trait CostStore {
    /// Get the costs for `user_id` within `range`, in the order they were created.
    ///
    /// The start of the range is inclusive and the end is exclusive.
    fn costs_in_range(
        &self,
        user_id: UserId,
        range: Range<OffsetDateTime>,
    ) -> Result<Vec<CostEntry>, Error>;
}

/// Saves and retrieves the reports for closed months.
pub trait ReportCacheStore {
    /// Get the saved report for `key`, if there is one.
    fn find_report(&self, key: &MonthKey) -> Result<Option<CachedReport>, Error>;

    /// Save `report` as the report for `key`.
    ///
    /// # Errors
    /// Must return [Error::DuplicateReport] if a report for `key` has already
    /// been saved. The existing report is left unchanged.
    fn insert_report(
        &self,
        key: &MonthKey,
        report: &MonthlyReport,
        computed_at: OffsetDateTime,
    ) -> Result<(), Error>;
}

/// Reads costs and cached reports from a SQLite database.
///
/// The connection lock is held for one statement at a time.
#[derive(Debug, Clone)]
pub struct SQLiteReportStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteReportStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Arc<Mutex<Connection>> {
        &self.connection
    }
}

impl CostStore for SQLiteReportStore {
    fn costs_in_range(
        &self,
        user_id: UserId,
        range: Range<OffsetDateTime>,
    ) -> Result<Vec<CostEntry>, Error> {
        let connection = lock_connection(&self.connection)?;

        get_costs_in_range(user_id, range, &connection)
    }
}

impl ReportCacheStore for SQLiteReportStore {
    fn find_report(&self, key: &MonthKey) -> Result<Option<CachedReport>, Error> {
        let connection = lock_connection(&self.connection)?;

        find_report(key, &connection)
    }

    fn insert_report(
        &self,
        key: &MonthKey,
        report: &MonthlyReport,
        computed_at: OffsetDateTime,
    ) -> Result<(), Error> {
        let connection = lock_connection(&self.connection)?;

        insert_report(key, report, computed_at, &connection).map(|_| ())
    }
}
