pub mod budget_grid;
pub mod debounced_saver;
pub mod grid_session;
pub mod grid_totals;

pub use budget_grid::{BudgetGrid, GridSections, Section};
pub use debounced_saver::{DebouncedSaver, ItemsSink, DEFAULT_SAVE_DELAY};
pub use grid_session::GridSession;
pub use grid_totals::{compute_totals, format_cell, format_cell_currency, GridTotals};
