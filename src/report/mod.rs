//! Monthly cost reports and the write-once cache for closed months.
//!
//! Reports for months that have ended are computed on the first request and
//! then read from the `report` table. Reports for the current month are
//! computed on every request.

mod aggregation;
mod cache;
mod endpoint;
mod gate;
mod models;
mod month;
mod store;

pub use cache::create_report_table;
pub use endpoint::get_report_endpoint;
pub use gate::get_report;
pub use models::{CachedReport, CategoryItems, MonthlyReport, ReportItem};
pub use month::MonthKey;
