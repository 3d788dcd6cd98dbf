//! Identifies the calendar month a report covers.

use std::{fmt::Display, ops::Range};

use time::{Date, Month, OffsetDateTime, UtcOffset};

use crate::{Error, user::UserId};

/// The earliest year a report may be requested for.
pub const MIN_YEAR: i32 = 1970;

/// The (user, year, month) identity of a monthly report.
///
/// A `MonthKey` always describes a valid calendar month. The month's first
/// day and the first day of the following month are computed when the key is
/// built, so the report window can be read back without any further checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonthKey {
    user_id: UserId,
    start: Date,
    end: Date,
}

impl MonthKey {
    /// Create a key for `month` (1 to 12) of `year`.
    ///
    /// # Errors
    /// Returns [Error::InvalidYear] if `year` is before 1970 or too large to
    /// represent, or [Error::InvalidMonth] if `month` is not in 1..=12.
    pub fn new(user_id: UserId, year: i32, month: u8) -> Result<Self, Error> {
        if year < MIN_YEAR {
            return Err(Error::InvalidYear);
        }

        let month = Month::try_from(month).map_err(|_| Error::InvalidMonth)?;
        let start = Date::from_calendar_date(year, month, 1).map_err(|_| Error::InvalidYear)?;

        let end = match month {
            Month::December => Date::from_calendar_date(year + 1, Month::January, 1),
            _ => Date::from_calendar_date(year, month.next(), 1),
        }
        .map_err(|_| Error::InvalidYear)?;

        Ok(Self {
            user_id,
            start,
            end,
        })
    }

    /// The user the report belongs to.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// The calendar year.
    pub fn year(&self) -> i32 {
        self.start.year()
    }

    /// The calendar month.
    pub fn month(&self) -> Month {
        self.start.month()
    }

    /// The calendar month as a number from 1 to 12.
    pub fn month_number(&self) -> u8 {
        self.start.month() as u8
    }

    /// The UTC instants the month covers.
    ///
    /// The start of the month is included and the start of the next month is
    /// excluded.
    pub fn window(&self) -> Range<OffsetDateTime> {
        self.start.midnight().assume_utc()..self.end.midnight().assume_utc()
    }

    /// Whether the month ended before the calendar month containing `now` in UTC.
    ///
    /// The current and future months are open: costs may still be added to them.
    pub fn is_closed(&self, now: OffsetDateTime) -> bool {
        let now = now.to_offset(UtcOffset::UTC);

        (self.year(), self.month_number()) < (now.year(), now.month() as u8)
    }
}

impl Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "user {} {:04}-{:02}",
            self.user_id,
            self.year(),
            self.month_number()
        )
    }
}
