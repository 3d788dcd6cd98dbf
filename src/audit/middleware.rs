//! Middleware that records every request in the audit log.

use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::audit::{AuditEntry, AuditLog, LogLevel};

/// The response header holding the ID assigned to the request.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Record an "HTTP request" entry for each request once its response is ready.
///
/// Each request is given a random ID which is included in the entry and sent
/// back to the client in the [REQUEST_ID_HEADER] header.
pub async fn audit_middleware(
    State(audit_log): State<AuditLog>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let request_id = Uuid::new_v4().to_string();
    let method = request.method().to_string();
    let path = request
        .uri()
        .path_and_query()
        .map_or_else(|| request.uri().path().to_owned(), |path| path.to_string());

    let mut response = next.run(request).await;

    let response_time_ms = u32::try_from(start.elapsed().as_millis()).unwrap_or(u32::MAX);

    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(REQUEST_ID_HEADER, header_value);
    }

    let mut entry = AuditEntry::new(audit_log.service(), LogLevel::Info, "HTTP request");
    entry.request_id = Some(request_id);
    entry.method = Some(method);
    entry.path = Some(path);
    entry.status_code = Some(response.status().as_u16());
    entry.response_time_ms = Some(response_time_ms);
    audit_log.record(entry);

    response
}
