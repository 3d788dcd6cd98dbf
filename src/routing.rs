//! Application router configuration.

use axum::{
    Router,
    http::Uri,
    middleware,
    routing::{get, post},
};

use crate::{
    AppState, Error,
    about::get_about_endpoint,
    audit::{audit_middleware, get_logs_endpoint},
    cost::create_cost_endpoint,
    endpoints,
    report::get_report_endpoint,
    user::{create_user_endpoint, get_user_endpoint, get_users_endpoint},
};

/// Return a router with all the app's routes.
///
/// Every request, including requests for unknown routes, is recorded in the audit log.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::ADD_COST, post(create_cost_endpoint))
        .route(endpoints::REPORT, get(get_report_endpoint))
        .route(
            endpoints::USERS,
            get(get_users_endpoint).post(create_user_endpoint),
        )
        .route(endpoints::USER, get(get_user_endpoint))
        .route(endpoints::LOGS, get(get_logs_endpoint))
        .route(endpoints::ABOUT, get(get_about_endpoint))
        .fallback(get_404_not_found)
        .layer(middleware::from_fn_with_state(
            state.audit_log.clone(),
            audit_middleware,
        ))
        .with_state(state)
}

async fn get_404_not_found(uri: Uri) -> Error {
    Error::RouteNotFound(uri.path().to_owned())
}
