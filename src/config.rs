//! Command line and environment configuration for the server.

use clap::{ArgAction, Parser};

use crate::{
    Error,
    about::{TeamMember, parse_team_members},
};

/// The REST API server for cost reports.
///
/// Every option can also be set with the environment variable named in its help text.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// File path to the application SQLite database.
    #[arg(long, env = "DB_PATH")]
    pub db_path: String,

    /// The port to serve the API from.
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// The service name written to each audit log entry.
    #[arg(long, env = "SERVICE_NAME", default_value = "costs-service")]
    pub service_name: String,

    /// Whether a cost may only be added for a user that exists.
    #[arg(long, env = "ENFORCE_USER_EXISTS", default_value_t = true, action = ArgAction::Set)]
    pub enforce_user_exists: bool,

    /// A JSON array of the team members listed by the about endpoint,
    /// e.g. '[{"first_name": "A", "last_name": "B"}]'.
    #[arg(long, env = "TEAM_MEMBERS_JSON")]
    pub team_members_json: Option<String>,
}

impl Config {
    /// Parse the configured team members.
    ///
    /// # Errors
    /// Returns [Error::InvalidTeamMembers] if the team members are not a JSON array.
    pub fn team_members(&self) -> Result<Vec<TeamMember>, Error> {
        match &self.team_members_json {
            Some(raw) => parse_team_members(raw),
            None => Ok(Vec::new()),
        }
    }
}
