//! Decides whether a report is served from the cache, computed, or computed and cached.

use time::OffsetDateTime;

use crate::{
    Error,
    category::CategoryConfig,
    report::{
        MonthKey, MonthlyReport,
        aggregation::compute_report,
        store::{CostStore, ReportCacheStore},
    },
};

/// Get the report for `key`.
///
/// Reports for open months (the month containing `now` and any later month)
/// are always computed from `costs` and never cached. Reports for closed
/// months are read from `cache`, or computed and written to `cache` if they
/// have not been cached yet.
///
/// No lock is held between reading and writing the cache. When several
/// requests miss on the same closed month they all compute the same report,
/// one of them caches it and the others have their insert rejected, which is
/// not treated as an error.
///
/// # Errors
/// Returns an error if the costs cannot be read, if the cache cannot be read,
/// or if the cache write fails for any reason other than the month already
/// being cached.
pub fn get_report(
    key: &MonthKey,
    now: OffsetDateTime,
    categories: &CategoryConfig,
    costs: &impl CostStore,
    cache: &impl ReportCacheStore,
) -> Result<MonthlyReport, Error> {
    if !key.is_closed(now) {
        tracing::debug!("computing report for open month {key}");
        return compute_report(key, categories, costs);
    }

    if let Some(cached) = cache.find_report(key)? {
        tracing::debug!("serving cached report for {key}");
        return Ok(cached.report);
    }

    let report = compute_report(key, categories, costs)?;

    match cache.insert_report(key, &report, now) {
        Ok(()) => tracing::debug!("cached report for {key}"),
        Err(Error::DuplicateReport(_)) => {
            tracing::info!("report for {key} was cached by a concurrent request");
        }
        Err(error) => return Err(error),
    }

    Ok(report)
}
