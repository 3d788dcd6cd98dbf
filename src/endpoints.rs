//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/users/{user_id}', use [format_endpoint].

/// The route to add a cost.
pub const ADD_COST: &str = "/api/add";
/// The route to get a user's monthly report.
pub const REPORT: &str = "/api/report";
/// The route to create and list users.
pub const USERS: &str = "/api/users";
/// The route to get a single user.
pub const USER: &str = "/api/users/{user_id}";
/// The route to read the audit log.
pub const LOGS: &str = "/api/logs";
/// The route to list the development team.
pub const ABOUT: &str = "/api/about";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// Assumes that the parameter is enclosed in braces, e.g. '{user_id}'.
/// The path is returned unchanged if it does not contain a parameter.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map_or(endpoint_path.len(), |offset| param_start + offset + 1);

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
