//! Groups a month of costs into a report.

use std::collections::HashMap;

use time::UtcOffset;

use crate::{
    Error,
    category::{Category, CategoryConfig},
    cost::CostEntry,
    report::{CategoryItems, MonthKey, MonthlyReport, ReportItem, store::CostStore},
};

/// Build the report for `key` from the costs stored in `store`.
///
/// # Errors
/// Only fails if the costs cannot be read from `store`. A month without any
/// costs gives a report where every category is empty.
pub fn compute_report(
    key: &MonthKey,
    categories: &CategoryConfig,
    store: &impl CostStore,
) -> Result<MonthlyReport, Error> {
    let costs = store.costs_in_range(key.user_id(), key.window())?;

    Ok(group_costs(key, categories, costs))
}

/// Group `costs` by category in report order.
///
/// Costs are sorted by their UTC day of the month. Costs on the same day keep
/// the order they were given in. Each category in the report order gets
/// exactly one entry, including categories with no costs.
pub(super) fn group_costs(
    key: &MonthKey,
    categories: &CategoryConfig,
    mut costs: Vec<CostEntry>,
) -> MonthlyReport {
    // Stable sort.
    costs.sort_by_key(utc_day);

    let mut items_by_category: HashMap<Category, Vec<ReportItem>> = HashMap::new();

    for cost in costs {
        let day = utc_day(&cost);

        items_by_category
            .entry(cost.category)
            .or_default()
            .push(ReportItem {
                amount: cost.amount,
                description: cost.description,
                day,
            });
    }

    let categorized_items = categories
        .report_order()
        .iter()
        .map(|&category| CategoryItems {
            category,
            items: items_by_category.remove(&category).unwrap_or_default(),
        })
        .collect();

    MonthlyReport {
        user_id: key.user_id(),
        year: key.year(),
        month: key.month_number(),
        categorized_items,
    }
}

fn utc_day(cost: &CostEntry) -> u8 {
    cost.occurred_at.to_offset(UtcOffset::UTC).day()
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;
    use time::{OffsetDateTime, macros::datetime};

    use crate::{
        category::{Category, CategoryConfig},
        cost::CostEntry,
        report::{MonthKey, aggregation::group_costs},
        user::UserId,
    };

    fn cost(id: i64, category: Category, description: &str, occurred_at: OffsetDateTime) -> CostEntry {
        CostEntry {
            id,
            user_id: UserId::new(123123),
            category,
            description: description.to_owned(),
            amount: Decimal::from_str("1.50").unwrap(),
            occurred_at,
        }
    }

    fn november() -> MonthKey {
        MonthKey::new(UserId::new(123123), 2025, 11).unwrap()
    }

    fn descriptions(report: &crate::MonthlyReport, index: usize) -> Vec<&str> {
        report.categorized_items[index]
            .items
            .iter()
            .map(|item| item.description.as_str())
            .collect()
    }

    #[test]
    fn empty_month_lists_every_category() {
        let report = group_costs(&november(), &CategoryConfig::default(), Vec::new());

        let categories: Vec<Category> = report
            .categorized_items
            .iter()
            .map(|entry| entry.category)
            .collect();
        assert_eq!(
            categories,
            vec![
                Category::Food,
                Category::Education,
                Category::Health,
                Category::Housing,
                Category::Sports,
            ]
        );
        assert!(report.categorized_items.iter().all(|entry| entry.items.is_empty()));
        assert_eq!(report.user_id, UserId::new(123123));
        assert_eq!(report.year, 2025);
        assert_eq!(report.month, 11);
    }

    #[test]
    fn groups_by_category() {
        let costs = vec![
            cost(1, Category::Sports, "ball", datetime!(2025-11-03 10:00 UTC)),
            cost(2, Category::Food, "choco", datetime!(2025-11-17 10:00 UTC)),
            cost(3, Category::Sports, "gym", datetime!(2025-11-04 10:00 UTC)),
        ];

        let report = group_costs(&november(), &CategoryConfig::default(), costs);

        assert_eq!(descriptions(&report, 0), vec!["choco"]);
        assert_eq!(descriptions(&report, 4), vec!["ball", "gym"]);
        assert_eq!(report.categorized_items[0].items[0].day, 17);
        assert_eq!(
            report.categorized_items[0].items[0].amount.to_string(),
            "1.50"
        );
    }

    #[test]
    fn sorts_by_day_keeping_creation_order_for_ties() {
        let costs = vec![
            cost(1, Category::Food, "late", datetime!(2025-11-20 08:00 UTC)),
            cost(2, Category::Food, "second", datetime!(2025-11-05 23:00 UTC)),
            cost(3, Category::Food, "first", datetime!(2025-11-05 01:00 UTC)),
            cost(4, Category::Food, "third", datetime!(2025-11-05 12:00 UTC)),
        ];

        let report = group_costs(&november(), &CategoryConfig::default(), costs);

        // Only the day is compared, so costs on the 5th keep their given order.
        assert_eq!(
            descriptions(&report, 0),
            vec!["second", "first", "third", "late"]
        );
    }

    #[test]
    fn day_is_taken_in_utc() {
        let occurred_at = datetime!(2025-11-18 01:00 +05:00);
        let report = group_costs(
            &november(),
            &CategoryConfig::default(),
            vec![cost(1, Category::Health, "pills", occurred_at)],
        );

        assert_eq!(report.categorized_items[2].items[0].day, 17);
    }

    #[test]
    fn follows_configured_report_order() {
        let categories = CategoryConfig::new(
            vec![Category::Food, Category::Sports],
            vec![Category::Sports, Category::Food],
        )
        .unwrap();

        let report = group_costs(&november(), &categories, Vec::new());

        assert_eq!(report.categorized_items.len(), 2);
        assert_eq!(report.categorized_items[0].category, Category::Sports);
        assert_eq!(report.categorized_items[1].category, Category::Food);
    }

    #[test]
    fn same_costs_give_same_report() {
        let costs = vec![
            cost(1, Category::Food, "a", datetime!(2025-11-03 10:00 UTC)),
            cost(2, Category::Housing, "b", datetime!(2025-11-03 10:00 UTC)),
        ];

        let first = group_costs(&november(), &CategoryConfig::default(), costs.clone());
        let second = group_costs(&november(), &CategoryConfig::default(), costs);

        assert_eq!(first, second);
    }
}
