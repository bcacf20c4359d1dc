//! A budget grid whose edits persist themselves.

use chrono::NaiveDate;

use crate::budget_items::{ItemKind, ItemRole, LineItem};
use crate::errors::Result;
use crate::grid::budget_grid::BudgetGrid;
use crate::grid::debounced_saver::{DebouncedSaver, ItemsSink};
use crate::months::Month;

/// Wraps a [`BudgetGrid`] and schedules a full-year save after every successful
/// change. Rejected edits schedule nothing.
pub struct GridSession<S: ItemsSink> {
    grid: BudgetGrid,
    saver: DebouncedSaver<S>,
}

impl<S: ItemsSink> GridSession<S> {
    pub fn new(grid: BudgetGrid, saver: DebouncedSaver<S>) -> Self {
        Self { grid, saver }
    }

    pub fn grid(&self) -> &BudgetGrid {
        &self.grid
    }

    pub fn saver(&self) -> &DebouncedSaver<S> {
        &self.saver
    }

    fn changed(&self) {
        self.saver.schedule(self.grid.year(), self.grid.items().to_vec());
    }

    pub fn insert_item(&mut self, item: LineItem) -> usize {
        let index = self.grid.insert_item(item);
        self.changed();
        index
    }

    /// Adds a new item and returns its id.
    pub fn add_item(&mut self, name: &str, kind: ItemKind, role: ItemRole) -> String {
        let id = self.grid.add_item(name, kind, role).id.clone();
        self.changed();
        id
    }

    pub fn remove_item(&mut self, item_id: &str) -> Option<LineItem> {
        let removed = self.grid.remove_item(item_id)?;
        self.changed();
        Some(removed)
    }

    pub fn rename_item(&mut self, item_id: &str, name: &str) -> Result<()> {
        self.grid.rename_item(item_id, name)?;
        self.changed();
        Ok(())
    }

    pub fn set_cell(&mut self, item_id: &str, month: Month, input: &str) -> Result<f64> {
        let value = self.grid.set_cell(item_id, month, input)?;
        self.changed();
        Ok(value)
    }

    pub fn set_static_expense(&mut self, item_id: &str, date: NaiveDate, price: f64) -> Result<()> {
        self.grid.set_static_expense(item_id, date, price)?;
        self.changed();
        Ok(())
    }

    pub fn link_loan(&mut self, item_id: &str, loan_id: Option<&str>) -> Result<()> {
        self.grid.link_loan(item_id, loan_id)?;
        self.changed();
        Ok(())
    }

    pub fn move_item(&mut self, dragged_id: &str, target_id: &str) -> bool {
        let moved = self.grid.move_item(dragged_id, target_id);
        if moved {
            self.changed();
        }
        moved
    }

    /// Saves the current items now, dropping any pending timer.
    pub async fn flush(&self) -> Result<()> {
        self.saver.flush(self.grid.year(), self.grid.items().to_vec()).await
    }

    pub fn into_grid(self) -> BudgetGrid {
        self.grid
    }
}
