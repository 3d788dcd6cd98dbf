//! Defines the cost model and the database queries for costs.

use std::{ops::Range, str::FromStr};

use rust_decimal::Decimal;
use rusqlite::{Connection, Row, types::Type};
use time::{Duration, OffsetDateTime, UtcOffset};

use crate::{
    Error,
    category::Category,
    timestamp::{get_timestamp, to_unix_micros},
    user::UserId,
};

/// Alias for the integer type used for cost IDs.
pub type CostId = i64;

/// How far in the past a new cost may be dated.
///
/// A little slack is allowed so that a timestamp taken by the client just
/// before sending the request is not rejected.
pub const BACKDATE_TOLERANCE: Duration = Duration::seconds(5);

// ============================================================================
// MODELS
// ============================================================================

/// Money a user spent on something.
///
/// Costs are never edited or deleted once created.
#[derive(Debug, Clone, PartialEq)]
pub struct CostEntry {
    /// The ID of the cost.
    pub id: CostId,
    /// The user who spent the money.
    pub user_id: UserId,
    /// What the money was spent on.
    pub category: Category,
    /// A text description of what the cost was for.
    pub description: String,
    /// The amount of money spent, kept at full decimal precision.
    pub amount: Decimal,
    /// When the cost happened, in UTC.
    pub occurred_at: OffsetDateTime,
}

/// A validated cost that has not been saved yet.
///
/// To create a `NewCost`, use [NewCost::new].
#[derive(Debug, Clone, PartialEq)]
pub struct NewCost {
    user_id: UserId,
    category: Category,
    description: String,
    amount: Decimal,
    occurred_at: OffsetDateTime,
}

impl NewCost {
    /// Validate a new cost.
    ///
    /// The description is trimmed and `occurred_at` is converted to UTC.
    ///
    /// # Errors
    /// Returns an [Error::EmptyDescription] if the description is empty after
    /// trimming, or an [Error::PastDate] if `occurred_at` is earlier than
    /// `now` minus [BACKDATE_TOLERANCE]. Months that have ended are cached
    /// forever, so costs must not be added to them after the fact.
    pub fn new(
        user_id: UserId,
        category: Category,
        description: &str,
        amount: Decimal,
        occurred_at: OffsetDateTime,
        now: OffsetDateTime,
    ) -> Result<Self, Error> {
        let description = description.trim();
        if description.is_empty() {
            return Err(Error::EmptyDescription);
        }

        if occurred_at < now - BACKDATE_TOLERANCE {
            return Err(Error::PastDate(occurred_at));
        }

        Ok(Self {
            user_id,
            category,
            description: description.to_owned(),
            amount,
            occurred_at: occurred_at.to_offset(UtcOffset::UTC),
        })
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new cost in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn create_cost(cost: NewCost, connection: &Connection) -> Result<CostEntry, Error> {
    connection
        .prepare(
            "INSERT INTO cost (user_id, category, description, amount, occurred_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, user_id, category, description, amount, occurred_at",
        )?
        .query_row(
            (
                cost.user_id.as_i64(),
                cost.category.as_str(),
                &cost.description,
                cost.amount.to_string(),
                to_unix_micros(cost.occurred_at),
            ),
            map_cost_row,
        )
        .map_err(|error| error.into())
}

/// Get the costs for `user_id` that occurred within `range`.
///
/// The start of the range is inclusive and the end is exclusive. Costs are
/// returned in the order they were created.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_costs_in_range(
    user_id: UserId,
    range: Range<OffsetDateTime>,
    connection: &Connection,
) -> Result<Vec<CostEntry>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, category, description, amount, occurred_at
             FROM cost
             WHERE user_id = ?1 AND occurred_at >= ?2 AND occurred_at < ?3
             ORDER BY id ASC",
        )?
        .query_map(
            (
                user_id.as_i64(),
                to_unix_micros(range.start),
                to_unix_micros(range.end),
            ),
            map_cost_row,
        )?
        .map(|maybe_cost| maybe_cost.map_err(|error| error.into()))
        .collect()
}

/// Get the exact sum of every cost `user_id` has recorded.
///
/// Amounts are summed as decimals rather than in SQL so that no precision is
/// lost to floating point arithmetic.
///
/// # Errors
/// This function will return a:
/// - [Error::TotalOverflow] if the sum does not fit in a [Decimal],
/// - or [Error::SqlError] if there is an SQL error.
pub fn get_total_cost_for_user(user_id: UserId, connection: &Connection) -> Result<Decimal, Error> {
    connection
        .prepare("SELECT amount FROM cost WHERE user_id = ?1")?
        .query_map((user_id.as_i64(),), |row| get_decimal(row, 0))?
        .try_fold(Decimal::ZERO, |total, amount| {
            total
                .checked_add(amount?)
                .ok_or(Error::TotalOverflow(user_id))
        })
}

/// Create the cost table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_cost_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS cost (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                category TEXT NOT NULL,
                description TEXT NOT NULL,
                amount TEXT NOT NULL,
                occurred_at INTEGER NOT NULL
                )",
        (),
    )?;

    // Add composite index used by the monthly report.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_cost_user_occurred_at ON cost(user_id, occurred_at);",
        (),
    )?;

    Ok(())
}

fn map_cost_row(row: &Row) -> Result<CostEntry, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id = UserId::new(row.get(1)?);
    let raw_category: String = row.get(2)?;
    let category = raw_category
        .parse::<Category>()
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(error)))?;
    let description = row.get(3)?;
    let amount = get_decimal(row, 4)?;
    let occurred_at = get_timestamp(row, 5)?;

    Ok(CostEntry {
        id,
        user_id,
        category,
        description,
        amount,
        occurred_at,
    })
}

/// Decimals are stored as text so they can be read back exactly as they were written.
fn get_decimal(row: &Row, index: usize) -> Result<Decimal, rusqlite::Error> {
    let raw_amount: String = row.get(index)?;

    Decimal::from_str(&raw_amount)
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error)))
}

// ============================================================================
// TESTS
// ============================================================================
