//! The fixed set of cost categories and the order they appear in reports.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// What a cost was spent on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Groceries, eating out, etc.
    Food,
    /// Courses, books, tuition, etc.
    Education,
    /// Doctors, medicine, insurance, etc.
    Health,
    /// Rent, mortgage, utilities, etc.
    Housing,
    /// Gym memberships, equipment, etc.
    Sports,
}

impl Category {
    /// The lowercase name used in the database and in JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Education => "education",
            Category::Health => "health",
            Category::Housing => "housing",
            Category::Sports => "sports",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The error returned when a string is not the name of a [Category].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("\"{0}\" is not a category")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "food" => Ok(Category::Food),
            "education" => Ok(Category::Education),
            "health" => Ok(Category::Health),
            "housing" => Ok(Category::Housing),
            "sports" => Ok(Category::Sports),
            other => Err(UnknownCategory(other.to_owned())),
        }
    }
}

/// The categories the service accepts and the order they are listed in reports.
///
/// This is built once at start up and shared by the cost validator and the
/// report aggregator so that both agree on the same set of categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryConfig {
    allowed: Vec<Category>,
    report_order: Vec<Category>,
}

impl CategoryConfig {
    /// Create a category configuration.
    ///
    /// # Errors
    /// Returns [Error::InvalidCategoryConfig] if `report_order` contains a
    /// duplicate or is not a permutation of `allowed`. Every report lists each
    /// allowed category exactly once, so the two lists must agree.
    pub fn new(allowed: Vec<Category>, report_order: Vec<Category>) -> Result<Self, Error> {
        for (i, category) in report_order.iter().enumerate() {
            if report_order[..i].contains(category) {
                return Err(Error::InvalidCategoryConfig(format!(
                    "{category} appears more than once in the report order"
                )));
            }

            if !allowed.contains(category) {
                return Err(Error::InvalidCategoryConfig(format!(
                    "{category} is in the report order but is not an allowed category"
                )));
            }
        }

        if let Some(missing) = allowed.iter().find(|c| !report_order.contains(c)) {
            return Err(Error::InvalidCategoryConfig(format!(
                "{missing} is an allowed category but is missing from the report order"
            )));
        }

        Ok(Self {
            allowed,
            report_order,
        })
    }

    /// The categories a new cost may use.
    pub fn allowed(&self) -> &[Category] {
        &self.allowed
    }

    /// The order categories are listed in a monthly report.
    pub fn report_order(&self) -> &[Category] {
        &self.report_order
    }

    /// Parse `raw` as one of the allowed categories.
    ///
    /// # Errors
    /// Returns [Error::UnsupportedCategory] if `raw` is not an allowed category.
    pub fn parse_allowed(&self, raw: &str) -> Result<Category, Error> {
        match raw.parse::<Category>() {
            Ok(category) if self.allowed.contains(&category) => Ok(category),
            _ => Err(Error::UnsupportedCategory {
                category: raw.to_owned(),
                allowed: self
                    .allowed
                    .iter()
                    .map(Category::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            allowed: vec![
                Category::Food,
                Category::Health,
                Category::Housing,
                Category::Sports,
                Category::Education,
            ],
            report_order: vec![
                Category::Food,
                Category::Education,
                Category::Health,
                Category::Housing,
                Category::Sports,
            ],
        }
    }
}
