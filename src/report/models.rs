//! The monthly report and how it is written as JSON.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::Error as _,
    ser::SerializeMap,
};
use time::OffsetDateTime;

use crate::{category::Category, user::UserId};

/// A single cost as it appears in a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportItem {
    /// The amount spent.
    #[serde(rename = "sum", with = "rust_decimal::serde::arbitrary_precision")]
    pub amount: Decimal,
    /// What the cost was for.
    pub description: String,
    /// The day of the month, in UTC, that the cost happened.
    pub day: u8,
}

/// The costs for one category, ordered by day.
///
/// In JSON this is an object with the category name as its only key, e.g.
/// `{"food": [{"sum": 12, "description": "choco", "day": 17}]}`.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryItems {
    /// The category the items belong to.
    pub category: Category,
    /// The costs in the category.
    pub items: Vec<ReportItem>,
}

impl Serialize for CategoryItems {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.category, &self.items)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for CategoryItems {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = BTreeMap::<Category, Vec<ReportItem>>::deserialize(deserializer)?;

        if map.len() != 1 {
            return Err(D::Error::invalid_length(
                map.len(),
                &"an object with exactly one category",
            ));
        }

        map.into_iter()
            .next()
            .map(|(category, items)| CategoryItems { category, items })
            .ok_or_else(|| D::Error::custom("missing category"))
    }
}

/// A user's costs for one calendar month, grouped by category.
///
/// There is exactly one entry per category, listed in the configured report
/// order, even when a category has no costs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReport {
    /// The user the report belongs to.
    #[serde(rename = "userid")]
    pub user_id: UserId,
    /// The calendar year.
    pub year: i32,
    /// The calendar month, from 1 to 12.
    pub month: u8,
    /// The costs grouped by category.
    #[serde(rename = "costs")]
    pub categorized_items: Vec<CategoryItems>,
}

/// A report for a closed month that has been saved to the database.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedReport {
    /// The ID of the database row.
    pub id: i64,
    /// The saved report.
    pub report: MonthlyReport,
    /// When the report was computed.
    pub computed_at: OffsetDateTime,
}
