#![allow(missing_docs)]

use axum::{body::Body, http::Response};
use rusqlite::Connection;

use crate::{AppState, CategoryConfig};

/// Create app state backed by a fresh in-memory database.
pub(crate) fn get_test_app_state() -> AppState {
    AppState::new(
        Connection::open_in_memory().expect("Could not open database in memory."),
        "costs-service",
        CategoryConfig::default(),
        true,
        Vec::new(),
    )
    .expect("Could not create app state.")
}

pub(crate) async fn parse_json_body(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Could not read response body");

    serde_json::from_slice(&body).expect("Response body is not valid JSON")
}
