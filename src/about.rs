//! Describes the team that develops the service.

use std::sync::Arc;

use axum::{
    Json,
    extract::{FromRef, State},
};
use serde::{Deserialize, Serialize};

use crate::{AppState, Error, audit::AuditLog, endpoints};

/// A member of the development team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    /// The member's first name.
    #[serde(default)]
    pub first_name: String,
    /// The member's last name.
    #[serde(default)]
    pub last_name: String,
}

/// Parse a JSON array of team members, e.g. `[{"first_name": "A", "last_name": "B"}]`.
///
/// A blank string gives an empty team. Missing names default to empty
/// strings and any other fields are dropped.
///
/// # Errors
/// Returns [Error::InvalidTeamMembers] if `raw` is not a JSON array of objects.
pub fn parse_team_members(raw: &str) -> Result<Vec<TeamMember>, Error> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_str(raw).map_err(|error| Error::InvalidTeamMembers(error.to_string()))
}

/// The state needed by the about endpoint.
#[derive(Debug, Clone)]
pub struct AboutState {
    /// The configured team members.
    pub team_members: Arc<[TeamMember]>,
    /// Where endpoint accesses are recorded.
    pub audit_log: AuditLog,
}

impl FromRef<AppState> for AboutState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            team_members: state.team_members.clone(),
            audit_log: state.audit_log.clone(),
        }
    }
}

/// A route handler for listing the team members.
pub async fn get_about_endpoint(State(state): State<AboutState>) -> Json<Vec<TeamMember>> {
    state.audit_log.endpoint_accessed("GET", endpoints::ABOUT);

    Json(state.team_members.to_vec())
}
