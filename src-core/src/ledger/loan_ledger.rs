use std::collections::{BTreeMap, BTreeSet};

use crate::budget_items::{ItemKind, LineItem};
use crate::ledger::loan_ledger_model::LoanPayment;
use crate::loans::Loan;

/// Sum of a year's expense cells linked to `loan_id`.
pub fn yearly_payment(items: &[LineItem], loan_id: &str) -> f64 {
    items
        .iter()
        .filter(|item| item.kind == ItemKind::Expense && item.linked_loan_id() == Some(loan_id))
        .map(|item| item.resolved_months().total())
        .sum()
}

/// Builds the repayment ledger for every loan.
///
/// Each loan walks the budget years (numeric order) from its start year onwards,
/// carrying `remaining = max(0, remaining - payment)` from the principal. A row is
/// emitted for the start year and for every later year with a non-zero payment.
/// Rows are ordered by year descending, then loan name.
pub fn build_loan_ledger(
    loans: &[Loan],
    items_by_year: &BTreeMap<String, Vec<LineItem>>,
) -> Vec<LoanPayment> {
    let mut budget_years: Vec<(i32, &str)> = items_by_year
        .keys()
        .filter_map(|y| y.trim().parse::<i32>().ok().map(|n| (n, y.as_str())))
        .collect();
    budget_years.sort();

    let mut rows = Vec::new();
    for loan in loans {
        let start_year = loan.start_year();
        let mut years: BTreeSet<i32> = budget_years
            .iter()
            .map(|(n, _)| *n)
            .filter(|n| start_year.map_or(true, |s| *n >= s))
            .collect();
        if let Some(start) = start_year {
            years.insert(start);
        }

        let mut remaining = loan.amount;
        for year in years {
            let payment = budget_years
                .iter()
                .filter(|(n, _)| *n == year)
                .filter_map(|(_, key)| items_by_year.get(*key))
                .map(|items| yearly_payment(items, &loan.id))
                .sum::<f64>();
            remaining = (remaining - payment).max(0.0);

            if payment != 0.0 || Some(year) == start_year {
                rows.push(LoanPayment {
                    loan_id: loan.id.clone(),
                    loan_name: loan.name.clone(),
                    year: year.to_string(),
                    total_payment: payment,
                    remaining,
                });
            }
        }
    }

    rows.sort_by(|a, b| {
        let ya = a.year.parse::<i32>().unwrap_or_default();
        let yb = b.year.parse::<i32>().unwrap_or_default();
        yb.cmp(&ya).then_with(|| a.loan_name.cmp(&b.loan_name))
    });
    rows
}

/// Ledger rows for a single year, in ledger order.
pub fn rows_for_year<'a>(ledger: &'a [LoanPayment], year: &str) -> Vec<&'a LoanPayment> {
    ledger.iter().filter(|row| row.year == year.trim()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget_items::ItemRole;
    use crate::months::Month;
    use chrono::NaiveDateTime;

    fn loan(id: &str, name: &str, amount: f64, start: &str) -> Loan {
        Loan {
            id: id.to_string(),
            user_id: "u1".to_string(),
            name: name.to_string(),
            amount,
            start_date: start.to_string(),
            created_at: NaiveDateTime::default(),
            updated_at: NaiveDateTime::default(),
        }
    }

    fn repayment(loan_id: &str, monthly: f64) -> LineItem {
        let mut item =
            LineItem::new("Repayment", ItemKind::Expense).with_role(ItemRole::LoanLinked {
                loan_id: loan_id.to_string(),
            });
        for month in Month::ALL {
            item.months.set(month, monthly);
        }
        item
    }

    #[test]
    fn remaining_balance_is_clamped_at_zero() {
        let loans = vec![loan("l1", "Car", 2000.0, "2023-06-01")];
        let mut years = BTreeMap::new();
        years.insert("2023".to_string(), vec![repayment("l1", 100.0)]);
        years.insert("2024".to_string(), vec![repayment("l1", 100.0)]);

        let ledger = build_loan_ledger(&loans, &years);
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger[0].year, "2024");
        assert_eq!(ledger[0].total_payment, 1200.0);
        assert_eq!(ledger[0].remaining, 0.0);
        assert_eq!(ledger[1].year, "2023");
        assert_eq!(ledger[1].remaining, 800.0);
    }

    #[test]
    fn years_before_start_and_quiet_years_are_skipped() {
        let loans = vec![loan("l1", "Car", 5000.0, "2024-01-15")];
        let mut years = BTreeMap::new();
        years.insert("2023".to_string(), vec![repayment("l1", 50.0)]);
        years.insert("2024".to_string(), vec![]);
        years.insert("2025".to_string(), vec![repayment("l1", 100.0)]);
        years.insert("2026".to_string(), vec![LineItem::new("Other", ItemKind::Expense)]);

        let ledger = build_loan_ledger(&loans, &years);
        let emitted: Vec<&str> = ledger.iter().map(|r| r.year.as_str()).collect();
        assert_eq!(emitted, vec!["2025", "2024"]);
        assert_eq!(ledger[1].total_payment, 0.0);
        assert_eq!(ledger[1].remaining, 5000.0);
        assert_eq!(ledger[0].remaining, 3800.0);
    }

    #[test]
    fn start_year_without_budget_still_gets_a_row() {
        let loans = vec![loan("l1", "Student", 1000.0, "2022-09-01")];
        let ledger = build_loan_ledger(&loans, &BTreeMap::new());
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].year, "2022");
        assert_eq!(ledger[0].remaining, 1000.0);
    }

    #[test]
    fn rows_sorted_by_year_desc_then_name() {
        let loans = vec![
            loan("l2", "Zeta", 100.0, "2024-01-01"),
            loan("l1", "Alpha", 100.0, "2024-01-01"),
        ];
        let mut years = BTreeMap::new();
        years.insert(
            "2025".to_string(),
            vec![repayment("l1", 1.0), repayment("l2", 1.0)],
        );
        let ledger = build_loan_ledger(&loans, &years);
        let order: Vec<(&str, &str)> = ledger
            .iter()
            .map(|r| (r.year.as_str(), r.loan_name.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("2025", "Alpha"),
                ("2025", "Zeta"),
                ("2024", "Alpha"),
                ("2024", "Zeta")
            ]
        );
    }

    #[test]
    fn formulas_count_towards_payments() {
        let loans = vec![loan("l1", "Car", 1000.0, "2025-01-01")];
        let mut item = repayment("l1", 0.0);
        item.formulas.insert(Month::March, "=100*2".to_string());
        let mut years = BTreeMap::new();
        years.insert("2025".to_string(), vec![item]);
        let ledger = build_loan_ledger(&loans, &years);
        assert_eq!(ledger[0].total_payment, 200.0);
        assert_eq!(ledger[0].remaining, 800.0);
    }
}
