//! The audit log: a persistent record of requests and endpoint accesses.

mod core;
mod endpoint;
mod log;
mod middleware;

pub use core::{
    AuditEntry, LogLevel, MAX_LOG_LIMIT, create_log_table, get_logs, insert_log,
};
pub use endpoint::get_logs_endpoint;
pub use log::AuditLog;
pub use middleware::audit_middleware;
