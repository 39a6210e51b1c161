//! Expense aggregation for chart display.

use std::collections::HashMap;

use time::Date;

use crate::expense::{Expense, MonthKey};

/// Totals expense amounts per calendar month, in chronological order.
pub(super) fn monthly_totals(expenses: &[Expense]) -> Vec<(MonthKey, f64)> {
    let mut totals: HashMap<Date, f64> = HashMap::new();

    for expense in expenses {
        let month = expense.date.replace_day(1).unwrap();
        *totals.entry(month).or_insert(0.0) += expense.amount;
    }

    let mut sorted_months: Vec<Date> = totals.keys().copied().collect();
    sorted_months.sort();

    sorted_months
        .into_iter()
        .map(|month| (MonthKey::containing(month), totals[&month]))
        .collect()
}
