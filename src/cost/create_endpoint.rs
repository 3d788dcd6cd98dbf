//! Defines the endpoint for adding a new cost.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
};
use rust_decimal::Decimal;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{
    AppState, Error,
    audit::AuditLog,
    category::{Category, CategoryConfig},
    cost::core::{NewCost, create_cost},
    db::lock_connection,
    endpoints, field,
    user::{UserId, user_exists},
};

/// The state needed to add a cost.
#[derive(Debug, Clone)]
pub struct CreateCostState {
    /// The database connection for managing costs.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The categories a cost may use.
    pub categories: Arc<CategoryConfig>,
    /// Whether the cost's user must already exist.
    pub enforce_user_exists: bool,
    /// Where endpoint accesses are recorded.
    pub audit_log: AuditLog,
}

impl FromRef<AppState> for CreateCostState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            categories: state.categories.clone(),
            enforce_user_exists: state.enforce_user_exists,
            audit_log: state.audit_log.clone(),
        }
    }
}

/// The request body for adding a cost.
///
/// Fields are kept as raw JSON so that each one can be checked and reported
/// with its own error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostForm {
    /// Text detailing the cost.
    #[serde(default)]
    pub description: Option<Value>,
    /// The name of the category, checked against the allowed categories.
    #[serde(default)]
    pub category: Option<Value>,
    /// The ID of the user who spent the money.
    #[serde(default)]
    pub userid: Option<Value>,
    /// The amount spent, as a JSON number.
    #[serde(default)]
    pub sum: Option<Value>,
    /// When the cost happened as an RFC 3339 string. Defaults to the time the
    /// request is handled.
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<Value>,
}

/// The cost as it was saved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedCost {
    description: String,
    category: Category,
    userid: UserId,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    sum: Decimal,
    #[serde(rename = "createdAt", with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
}

/// A route handler for adding a new cost.
pub async fn create_cost_endpoint(
    State(state): State<CreateCostState>,
    body: Result<Json<CostForm>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedCost>), Error> {
    state.audit_log.endpoint_accessed("POST", endpoints::ADD_COST);

    let Json(form) = body.map_err(|rejection| Error::InvalidBody(rejection.body_text()))?;

    let description = field::non_empty_str(&form.description).ok_or(Error::EmptyDescription)?;
    let category = field::non_empty_str(&form.category).ok_or(Error::InvalidCategory)?;
    let category = state.categories.parse_allowed(category)?;
    let user_id = field::integer(&form.userid)
        .map(UserId::new)
        .ok_or(Error::InvalidCostUserId)?;
    let sum = field::decimal(&form.sum).ok_or(Error::InvalidSum)?;

    let connection = lock_connection(&state.db_connection)?;

    if state.enforce_user_exists && !user_exists(user_id, &connection)? {
        return Err(Error::UserNotFound(user_id));
    }

    let now = OffsetDateTime::now_utc();
    let occurred_at = match &form.created_at {
        None => now,
        Some(Value::String(raw)) => {
            OffsetDateTime::parse(raw, &Rfc3339).map_err(|_| Error::InvalidDate)?
        }
        Some(_) => return Err(Error::InvalidDate),
    };
    let cost = NewCost::new(user_id, category, description, sum, occurred_at, now)?;

    let cost = create_cost(cost, &connection)?;
    tracing::info!(cost_id = cost.id, user_id = %cost.user_id, "created cost");

    Ok((
        StatusCode::CREATED,
        Json(CreatedCost {
            description: cost.description,
            category: cost.category,
            userid: cost.user_id,
            sum: cost.amount,
            created_at: cost.occurred_at,
        }),
    ))
}
