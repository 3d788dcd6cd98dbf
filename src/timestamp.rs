//! Conversions between [OffsetDateTime] and the integer timestamps stored in the database.
//!
//! Timestamps are stored as microseconds since the Unix epoch in UTC so that
//! range queries compare integers rather than formatted strings.

use rusqlite::types::Type;
use time::OffsetDateTime;

/// Convert `datetime` to microseconds since the Unix epoch.
pub fn to_unix_micros(datetime: OffsetDateTime) -> i64 {
    (datetime.unix_timestamp_nanos() / 1_000) as i64
}

/// Convert microseconds since the Unix epoch to a UTC date-time.
pub fn from_unix_micros(micros: i64) -> Result<OffsetDateTime, time::error::ComponentRange> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(micros) * 1_000)
}

/// Read the timestamp column at `index` of `row`.
pub fn get_timestamp(row: &rusqlite::Row, index: usize) -> Result<OffsetDateTime, rusqlite::Error> {
    let micros: i64 = row.get(index)?;

    from_unix_micros(micros).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(index, Type::Integer, Box::new(error))
    })
}
