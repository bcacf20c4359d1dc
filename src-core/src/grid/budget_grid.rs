//! In-memory view model of one budget year.

use chrono::NaiveDate;

use crate::budget_items::{ItemKind, ItemRole, LineItem};
use crate::errors::{Error, Result};
use crate::formula;
use crate::grid::grid_totals::{compute_totals, GridTotals};
use crate::ledger::{rows_for_year, LoanPayment};
use crate::months::Month;

/// Display partition of a stored item. The fifth partition, loan rows, comes from
/// the ledger and is never a stored item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Income,
    Expenses,
    LoanExpenses,
    FunExpenses,
}

impl Section {
    pub fn of(item: &LineItem) -> Section {
        match (item.kind, &item.role) {
            (ItemKind::Income, _) => Section::Income,
            (ItemKind::Expense, ItemRole::None) => Section::Expenses,
            (ItemKind::Expense, ItemRole::LoanLinked { .. }) => Section::LoanExpenses,
            (ItemKind::Expense, ItemRole::StaticExpense { .. }) => Section::FunExpenses,
        }
    }
}

#[derive(Debug, Default)]
pub struct GridSections<'a> {
    pub income: Vec<&'a LineItem>,
    pub expenses: Vec<&'a LineItem>,
    pub loan_expenses: Vec<&'a LineItem>,
    pub fun_expenses: Vec<&'a LineItem>,
    pub loans: Vec<&'a LoanPayment>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BudgetGrid {
    year: String,
    items: Vec<LineItem>,
}

impl BudgetGrid {
    pub fn new(year: impl Into<String>, items: Vec<LineItem>) -> Self {
        let items = items
            .into_iter()
            .map(|mut item| {
                item.normalize();
                item
            })
            .collect();
        Self {
            year: year.into(),
            items,
        }
    }

    pub fn year(&self) -> &str {
        &self.year
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<LineItem> {
        self.items
    }

    pub fn find(&self, item_id: &str) -> Option<&LineItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    fn position(&self, item_id: &str) -> Result<usize> {
        self.items
            .iter()
            .position(|i| i.id == item_id)
            .ok_or_else(|| Error::NotFound(format!("Item '{}' not found", item_id)))
    }

    /// Inserts `item` at the end of its partition and returns its index.
    pub fn insert_item(&mut self, mut item: LineItem) -> usize {
        item.normalize();
        let rank = item.rank();
        let index = self
            .items
            .iter()
            .rposition(|existing| existing.rank() <= rank)
            .map_or(0, |last| last + 1);
        self.items.insert(index, item);
        index
    }

    pub fn add_item(&mut self, name: &str, kind: ItemKind, role: ItemRole) -> &LineItem {
        let index = self.insert_item(LineItem::new(name, kind).with_role(role));
        &self.items[index]
    }

    pub fn remove_item(&mut self, item_id: &str) -> Option<LineItem> {
        let index = self.position(item_id).ok()?;
        Some(self.items.remove(index))
    }

    pub fn rename_item(&mut self, item_id: &str, name: &str) -> Result<()> {
        let index = self.position(item_id)?;
        self.items[index].name = name.to_string();
        Ok(())
    }

    /// Applies user input to a cell. Input starting with `=` is kept as a formula
    /// and its result stored; anything else must be a number (blank means zero).
    /// Returns the cell's new value.
    pub fn set_cell(&mut self, item_id: &str, month: Month, input: &str) -> Result<f64> {
        let index = self.position(item_id)?;
        let item = &mut self.items[index];
        if item.is_static_expense() {
            return Err(Error::invalid_input(
                "Static expense cells follow the expense date and price",
            ));
        }

        let trimmed = input.trim();
        let value = if formula::is_formula(trimmed) {
            item.formulas.insert(month, trimmed.to_string());
            formula::evaluate_or_zero(trimmed)
        } else {
            item.formulas.remove(&month);
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed
                    .parse::<f64>()
                    .map_err(|_| Error::invalid_input(format!("'{}' is not a number", trimmed)))?
            }
        };
        item.months.set(month, value);
        Ok(value)
    }

    pub fn cell_value(&self, item_id: &str, month: Month) -> f64 {
        self.find(item_id).map_or(0.0, |item| item.cell_value(month))
    }

    /// Text to show while a cell is being edited: its formula if any, else the value.
    pub fn cell_input(&self, item_id: &str, month: Month) -> String {
        match self.find(item_id) {
            Some(item) => match item.formulas.get(&month) {
                Some(f) => f.clone(),
                None => item.months.get(month).to_string(),
            },
            None => String::new(),
        }
    }

    /// Turns an expense into a static expense (or moves an existing one): the price
    /// moves to the month of `date` and the previous bucket is cleared.
    pub fn set_static_expense(&mut self, item_id: &str, date: NaiveDate, price: f64) -> Result<()> {
        self.change_role(item_id, ItemRole::StaticExpense { date, price })
    }

    pub fn link_loan(&mut self, item_id: &str, loan_id: Option<&str>) -> Result<()> {
        let role = match loan_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => ItemRole::LoanLinked {
                loan_id: id.to_string(),
            },
            None => ItemRole::None,
        };
        self.change_role(item_id, role)
    }

    fn change_role(&mut self, item_id: &str, role: ItemRole) -> Result<()> {
        let index = self.position(item_id)?;
        if self.items[index].kind != ItemKind::Expense && role != ItemRole::None {
            return Err(Error::invalid_input("Only expense items can take a special role"));
        }
        let was_static = self.items[index].is_static_expense();
        let old_rank = self.items[index].rank();

        let item = &mut self.items[index];
        if was_static && !matches!(role, ItemRole::StaticExpense { .. }) {
            item.months.clear();
        }
        item.role = role;
        item.normalize();

        if item.rank() != old_rank {
            let item = self.items.remove(index);
            self.insert_item(item);
        }
        Ok(())
    }

    /// Drops `dragged_id` onto `target_id`. Only items of the same kind may swap
    /// places; returns whether the list changed.
    pub fn move_item(&mut self, dragged_id: &str, target_id: &str) -> bool {
        let (Ok(from), Ok(to)) = (self.position(dragged_id), self.position(target_id)) else {
            return false;
        };
        if from == to || self.items[from].kind != self.items[to].kind {
            return false;
        }
        let item = self.items.remove(from);
        self.items.insert(to, item);
        true
    }

    /// Items grouped for rendering, with this year's loan rows from `ledger`.
    pub fn sections<'a>(&'a self, ledger: &'a [LoanPayment]) -> GridSections<'a> {
        let mut sections = GridSections {
            loans: rows_for_year(ledger, &self.year),
            ..Default::default()
        };
        for item in &self.items {
            match Section::of(item) {
                Section::Income => sections.income.push(item),
                Section::Expenses => sections.expenses.push(item),
                Section::LoanExpenses => sections.loan_expenses.push(item),
                Section::FunExpenses => sections.fun_expenses.push(item),
            }
        }
        sections
    }

    pub fn totals(&self) -> GridTotals {
        compute_totals(&self.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(grid: &BudgetGrid) -> Vec<&str> {
        grid.items().iter().map(|i| i.name.as_str()).collect()
    }

    fn sample_grid() -> BudgetGrid {
        let mut grid = BudgetGrid::new("2025", vec![]);
        grid.add_item("Salary", ItemKind::Income, ItemRole::None);
        grid.add_item("Rent", ItemKind::Expense, ItemRole::None);
        grid.add_item(
            "Car loan",
            ItemKind::Expense,
            ItemRole::LoanLinked {
                loan_id: "loan-1".into(),
            },
        );
        grid.add_item(
            "Concert",
            ItemKind::Expense,
            ItemRole::StaticExpense {
                date: NaiveDate::from_ymd_opt(2025, 7, 15).unwrap(),
                price: 42.0,
            },
        );
        grid
    }

    #[test]
    fn insertion_keeps_partitions() {
        let mut grid = sample_grid();
        grid.add_item("Bonus", ItemKind::Income, ItemRole::None);
        grid.add_item("Food", ItemKind::Expense, ItemRole::None);
        grid.add_item(
            "Mortgage",
            ItemKind::Expense,
            ItemRole::LoanLinked {
                loan_id: "loan-2".into(),
            },
        );
        assert_eq!(
            names(&grid),
            vec!["Salary", "Bonus", "Rent", "Food", "Car loan", "Mortgage", "Concert"]
        );
    }

    #[test]
    fn static_expense_lands_in_its_month() {
        let grid = sample_grid();
        let concert = grid.items().iter().find(|i| i.name == "Concert").unwrap();
        assert_eq!(concert.months.get(Month::July), 42.0);
        for month in Month::ALL.iter().filter(|m| **m != Month::July) {
            assert_eq!(concert.months.get(*month), 0.0);
        }
    }

    #[test]
    fn changing_static_date_moves_the_bucket() {
        let mut grid = sample_grid();
        let id = grid.items()[3].id.clone();
        grid.set_static_expense(&id, NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(), 42.0)
            .unwrap();
        assert_eq!(grid.cell_value(&id, Month::July), 0.0);
        assert_eq!(grid.cell_value(&id, Month::February), 42.0);
    }

    #[test]
    fn converting_to_static_repositions_the_item() {
        let mut grid = sample_grid();
        let rent = grid.items()[1].id.clone();
        grid.set_static_expense(&rent, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), 10.0)
            .unwrap();
        assert_eq!(names(&grid), vec!["Salary", "Car loan", "Concert", "Rent"]);
        assert!(grid.link_loan(&grid.items()[0].id.clone(), Some("loan-1")).is_err());
    }

    #[test]
    fn cells_accept_numbers_and_formulas() {
        let mut grid = sample_grid();
        let rent = grid.items()[1].id.clone();
        assert_eq!(grid.set_cell(&rent, Month::January, "1200").unwrap(), 1200.0);
        assert_eq!(grid.set_cell(&rent, Month::February, "=600*2").unwrap(), 1200.0);
        assert_eq!(grid.cell_input(&rent, Month::February), "=600*2");
        assert_eq!(grid.set_cell(&rent, Month::March, "=600*x").unwrap(), 0.0);
        assert_eq!(grid.set_cell(&rent, Month::February, "").unwrap(), 0.0);
        assert_eq!(grid.cell_input(&rent, Month::February), "0");
        assert!(grid.set_cell(&rent, Month::April, "abc").is_err());

        let concert = grid.items()[3].id.clone();
        assert!(grid.set_cell(&concert, Month::July, "1").is_err());
    }

    #[test]
    fn drag_only_within_same_kind() {
        let mut grid = sample_grid();
        grid.add_item("Bonus", ItemKind::Income, ItemRole::None);
        let salary = grid.items()[0].id.clone();
        let bonus = grid.items()[1].id.clone();
        let rent = grid.items()[2].id.clone();
        let concert = grid.items()[4].id.clone();

        assert!(!grid.move_item(&salary, &rent));
        assert!(grid.move_item(&bonus, &salary));
        assert_eq!(grid.items()[0].name, "Bonus");
        assert!(grid.move_item(&concert, &rent));
        assert_eq!(
            names(&grid),
            vec!["Bonus", "Salary", "Concert", "Rent", "Car loan"]
        );
        assert!(!grid.move_item("missing", &rent));
    }

    #[test]
    fn sections_split_items_and_pick_year_loans() {
        let grid = sample_grid();
        let ledger = vec![
            LoanPayment {
                loan_id: "loan-1".into(),
                loan_name: "Car".into(),
                year: "2025".into(),
                total_payment: 0.0,
                remaining: 100.0,
            },
            LoanPayment {
                loan_id: "loan-1".into(),
                loan_name: "Car".into(),
                year: "2024".into(),
                total_payment: 0.0,
                remaining: 100.0,
            },
        ];
        let sections = grid.sections(&ledger);
        assert_eq!(sections.income.len(), 1);
        assert_eq!(sections.expenses.len(), 1);
        assert_eq!(sections.loan_expenses.len(), 1);
        assert_eq!(sections.fun_expenses.len(), 1);
        assert_eq!(sections.loans.len(), 1);
    }

    #[test]
    fn section_follows_kind_and_role() {
        let grid = sample_grid();
        let sections: Vec<Section> = grid.items().iter().map(Section::of).collect();
        assert_eq!(
            sections,
            vec![
                Section::Income,
                Section::Expenses,
                Section::LoanExpenses,
                Section::FunExpenses
            ]
        );
        let income_with_role = LineItem {
            role: ItemRole::LoanLinked {
                loan_id: "loan-1".into(),
            },
            ..LineItem::new("Refund", ItemKind::Income)
        };
        assert_eq!(Section::of(&income_with_role), Section::Income);
    }
}
