//! Cost reports is a web service for recording a user's costs and summarising
//! them as monthly reports grouped by category.
//!
//! This library provides a JSON REST API. Reports for months that have already
//! ended are computed once and then served from a write-once cache.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::Serialize;
use time::OffsetDateTime;
use tokio::signal;

mod about;
mod app_state;
mod audit;
mod category;
mod config;
mod cost;
mod db;
mod endpoints;
mod field;
mod report;
mod routing;
mod timestamp;
mod user;

#[cfg(test)]
mod test_utils;

pub use about::TeamMember;
pub use app_state::AppState;
pub use category::{Category, CategoryConfig};
pub use config::Config;
pub use db::{initialize as initialize_db, reset as reset_db};
pub use report::{MonthKey, MonthlyReport};
pub use routing::build_router;
pub use user::{User, UserId};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request body could not be parsed as the expected JSON document.
    #[error("could not parse the request body: {0}")]
    InvalidBody(String),

    /// The query string could not be parsed.
    #[error("could not parse the query string: {0}")]
    InvalidQuery(String),

    /// The user ID in the request was missing or not an integer.
    #[error("`id` (userid) must be a number")]
    InvalidUserId,

    /// The year in the request was missing, not an integer, or before 1970.
    #[error("`year` must be a number (>= 1970)")]
    InvalidYear,

    /// The month in the request was missing or outside of 1..=12.
    #[error("`month` must be a number (1..12)")]
    InvalidMonth,

    /// An empty string was used for a cost description.
    #[error("`description` must be a non-empty string")]
    EmptyDescription,

    /// The cost's category was missing, not a string, or blank.
    #[error("`category` must be a non-empty string")]
    InvalidCategory,

    /// The cost's user ID was missing or not an integer.
    #[error("`userid` must be a number")]
    InvalidCostUserId,

    /// The cost's sum was missing or not a JSON number that fits in a decimal.
    #[error("`sum` must be a number")]
    InvalidSum,

    /// The cost's date was not an RFC 3339 date-time string.
    #[error("`createdAt` must be an RFC 3339 date-time string")]
    InvalidDate,

    /// The category is not one of the categories the service accepts.
    #[error("unsupported category \"{category}\", category must be one of: {allowed}")]
    UnsupportedCategory {
        /// The category given by the client.
        category: String,
        /// A comma separated list of the accepted categories.
        allowed: String,
    },

    /// A cost was dated further in the past than the allowed tolerance.
    ///
    /// Costs for months that have ended are served from a cache that is never
    /// invalidated, so back-dated costs must be rejected.
    #[error("{0} is in the past, adding costs with dates in the past is not allowed")]
    PastDate(OffsetDateTime),

    /// An empty string was used for a user's first name.
    #[error("`first_name` must be a non-empty string")]
    EmptyFirstName,

    /// An empty string was used for a user's last name.
    #[error("`last_name` must be a non-empty string")]
    EmptyLastName,

    /// The birthday could not be parsed as a date.
    #[error("`birthday` must be a valid date (YYYY-MM-DD), got \"{0}\"")]
    InvalidBirthday(String),

    /// No user exists with the given ID.
    #[error("no user with id={0}")]
    UserNotFound(UserId),

    /// A user with the given ID already exists.
    #[error("user with id={0} already exists")]
    DuplicateUser(UserId),

    /// A cached report already exists for the month.
    ///
    /// This happens when two requests race to cache the same month. The
    /// report gate absorbs this error, so it never reaches a client.
    #[error("a report for {0} has already been cached")]
    DuplicateReport(MonthKey),

    /// The sum of a user's costs is too large to represent.
    #[error("the cost total for user {0} overflowed")]
    TotalOverflow(UserId),

    /// The category report order is not a permutation of the allowed categories.
    #[error("invalid category configuration: {0}")]
    InvalidCategoryConfig(String),

    /// The configured team members could not be parsed.
    #[error("invalid team members JSON: {0}")]
    InvalidTeamMembers(String),

    /// No route matches the request.
    #[error("no route for {0}")]
    RouteNotFound(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        tracing::error!("an unhandled SQL error occurred: {}", value);
        Error::SqlError(value)
    }
}

impl Error {
    /// The machine readable error code sent to clients.
    pub fn id(&self) -> &'static str {
        match self {
            Error::InvalidBody(_) => "INVALID_BODY",
            Error::InvalidQuery(_) => "INVALID_QUERY",
            Error::InvalidUserId => "INVALID_ID",
            Error::InvalidYear => "INVALID_YEAR",
            Error::InvalidMonth => "INVALID_MONTH",
            Error::EmptyDescription => "INVALID_DESCRIPTION",
            Error::InvalidCategory => "INVALID_CATEGORY",
            Error::InvalidCostUserId => "INVALID_USERID",
            Error::InvalidSum => "INVALID_SUM",
            Error::InvalidDate => "INVALID_DATE",
            Error::UnsupportedCategory { .. } => "UNSUPPORTED_CATEGORY",
            Error::PastDate(_) => "PAST_DATE_NOT_ALLOWED",
            Error::EmptyFirstName => "INVALID_FIRST_NAME",
            Error::EmptyLastName => "INVALID_LAST_NAME",
            Error::InvalidBirthday(_) => "INVALID_BIRTHDAY",
            Error::UserNotFound(_) => "USER_NOT_FOUND",
            Error::DuplicateUser(_) => "USER_EXISTS",
            Error::RouteNotFound(_) => "NOT_FOUND",
            Error::DuplicateReport(_)
            | Error::TotalOverflow(_)
            | Error::InvalidCategoryConfig(_)
            | Error::InvalidTeamMembers(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError => "INTERNAL_ERROR",
        }
    }

    /// The HTTP status code for the error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidBody(_)
            | Error::InvalidQuery(_)
            | Error::InvalidUserId
            | Error::InvalidYear
            | Error::InvalidMonth
            | Error::EmptyDescription
            | Error::InvalidCategory
            | Error::InvalidCostUserId
            | Error::InvalidSum
            | Error::InvalidDate
            | Error::UnsupportedCategory { .. }
            | Error::PastDate(_)
            | Error::EmptyFirstName
            | Error::EmptyLastName
            | Error::InvalidBirthday(_) => StatusCode::BAD_REQUEST,
            Error::UserNotFound(_) | Error::RouteNotFound(_) => StatusCode::NOT_FOUND,
            Error::DuplicateUser(_) => StatusCode::CONFLICT,
            Error::DuplicateReport(_)
            | Error::TotalOverflow(_)
            | Error::InvalidCategoryConfig(_)
            | Error::InvalidTeamMembers(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// The JSON body sent to clients when a request fails.
#[derive(Debug, Serialize)]
struct ErrorBody {
    id: &'static str,
    message: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            // Internal errors are not intended to be shown to the client.
            tracing::error!("An unexpected error occurred: {}", self);
            "Unexpected server error".to_owned()
        } else {
            self.to_string()
        };

        let body = ErrorBody {
            id: self.id(),
            message,
        };

        (status, Json(body)).into_response()
    }
}
