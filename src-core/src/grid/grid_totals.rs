use crate::budget_items::{ItemKind, LineItem};
use crate::currency::{format_currency, format_plain, Currency};
use crate::months::{Month, MonthlyValues};

/// Per-month sums over a budget year.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GridTotals {
    pub income: MonthlyValues,
    pub expenses: MonthlyValues,
    /// income - expenses
    pub savings: MonthlyValues,
    /// Running sum of savings from January.
    pub cumulative_savings: MonthlyValues,
}

pub fn compute_totals(items: &[LineItem]) -> GridTotals {
    let mut totals = GridTotals::default();
    for item in items {
        let target = match item.kind {
            ItemKind::Income => &mut totals.income,
            ItemKind::Expense => &mut totals.expenses,
        };
        for month in Month::ALL {
            target.set(month, target.get(month) + item.cell_value(month));
        }
    }

    let mut running = 0.0;
    for month in Month::ALL {
        let saved = totals.income.get(month) - totals.expenses.get(month);
        totals.savings.set(month, saved);
        running += saved;
        totals.cumulative_savings.set(month, running);
    }
    totals
}

fn is_blank(value: f64) -> bool {
    value.abs() < 0.005 || !value.is_finite()
}

/// Cell text: `-` for zero, otherwise two decimals.
pub fn format_cell(value: f64) -> String {
    if is_blank(value) {
        "-".to_string()
    } else {
        format_plain(value)
    }
}

pub fn format_cell_currency(value: f64, currency: &Currency) -> String {
    if is_blank(value) {
        "-".to_string()
    } else {
        format_currency(value, currency)
    }
}
