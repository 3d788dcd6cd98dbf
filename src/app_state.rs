//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{Error, about::TeamMember, audit::AuditLog, category::CategoryConfig, db::initialize};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,

    /// The categories costs may use and the order they appear in reports.
    pub categories: Arc<CategoryConfig>,

    /// Where requests and endpoint accesses are recorded.
    pub audit_log: AuditLog,

    /// Whether a cost may only be added for a user that exists.
    pub enforce_user_exists: bool,

    /// The team members listed by the about endpoint.
    pub team_members: Arc<[TeamMember]>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// `service_name` is written to each audit log entry.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        service_name: &str,
        categories: CategoryConfig,
        enforce_user_exists: bool,
        team_members: Vec<TeamMember>,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        let connection = Arc::new(Mutex::new(db_connection));

        Ok(Self {
            audit_log: AuditLog::new(service_name, connection.clone()),
            db_connection: connection,
            categories: Arc::new(categories),
            enforce_user_exists,
            team_members: team_members.into(),
        })
    }
}
