//! Endpoints for creating and reading users.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State, rejection::JsonRejection},
    http::{HeaderName, StatusCode, header::LOCATION},
};
use rust_decimal::Decimal;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    AppState, Error,
    audit::AuditLog,
    cost::get_total_cost_for_user,
    db::lock_connection,
    endpoints::{self, format_endpoint},
    field,
    user::{User, UserId, create_user, get_all_users, get_user},
};

/// The state needed by the user endpoints.
#[derive(Debug, Clone)]
pub struct UserState {
    /// The database connection for managing users.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Where endpoint accesses are recorded.
    pub audit_log: AuditLog,
}

impl FromRef<AppState> for UserState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            audit_log: state.audit_log.clone(),
        }
    }
}

/// The request body for creating a user.
///
/// Fields are kept as raw JSON so that each one can be checked and reported
/// with its own error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserForm {
    /// The ID the client wants for the new user, as a JSON integer.
    #[serde(default)]
    pub id: Option<Value>,
    /// The user's first name.
    #[serde(default)]
    pub first_name: Option<Value>,
    /// The user's last name.
    #[serde(default)]
    pub last_name: Option<Value>,
    /// The user's date of birth formatted as `YYYY-MM-DD`.
    #[serde(default)]
    pub birthday: Option<Value>,
}

/// A user along with the sum of all their costs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserDetails {
    /// The user's first name.
    pub first_name: String,
    /// The user's last name.
    pub last_name: String,
    /// The user's ID.
    pub id: UserId,
    /// The sum of every cost the user has recorded.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total: Decimal,
}

/// A route handler for creating a new user.
///
/// The response's `Location` header points to the new user.
pub async fn create_user_endpoint(
    State(state): State<UserState>,
    body: Result<Json<UserForm>, JsonRejection>,
) -> Result<(StatusCode, [(HeaderName, String); 1], Json<User>), Error> {
    state.audit_log.endpoint_accessed("POST", endpoints::USERS);

    let Json(form) = body.map_err(|rejection| Error::InvalidBody(rejection.body_text()))?;

    let id = field::integer(&form.id).ok_or(Error::InvalidUserId)?;
    let first_name = field::non_empty_str(&form.first_name).ok_or(Error::EmptyFirstName)?;
    let last_name = field::non_empty_str(&form.last_name).ok_or(Error::EmptyLastName)?;
    let birthday = match &form.birthday {
        Some(Value::String(birthday)) => birthday.as_str(),
        Some(other) => return Err(Error::InvalidBirthday(other.to_string())),
        None => return Err(Error::InvalidBirthday(String::new())),
    };

    let user = User::build(UserId::new(id), first_name, last_name, birthday)?;

    let connection = lock_connection(&state.db_connection)?;
    let user = create_user(user, &connection)?;
    tracing::info!(user_id = %user.id, "created user");

    let location = format_endpoint(endpoints::USER, user.id.as_i64());

    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(user)))
}

/// A route handler for listing every user.
pub async fn get_users_endpoint(State(state): State<UserState>) -> Result<Json<Vec<User>>, Error> {
    state.audit_log.endpoint_accessed("GET", endpoints::USERS);

    let connection = lock_connection(&state.db_connection)?;

    get_all_users(&connection).map(Json)
}

/// A route handler for getting a user's details and the total of their costs.
pub async fn get_user_endpoint(
    State(state): State<UserState>,
    Path(raw_user_id): Path<String>,
) -> Result<Json<UserDetails>, Error> {
    state.audit_log.endpoint_accessed("GET", endpoints::USER);

    let user_id = raw_user_id
        .trim()
        .parse::<i64>()
        .map(UserId::new)
        .map_err(|_| Error::InvalidUserId)?;

    let connection = lock_connection(&state.db_connection)?;
    let user = get_user(user_id, &connection)?;
    let total = get_total_cost_for_user(user_id, &connection)?;

    Ok(Json(UserDetails {
        first_name: user.first_name,
        last_name: user.last_name,
        id: user.id,
        total,
    }))
}
