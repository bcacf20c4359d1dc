pub mod budget_items;
pub mod budgets;
pub mod client;
pub mod currency;
pub mod db;
pub mod errors;
pub mod formula;
pub mod grid;
pub mod ledger;
pub mod loans;
pub mod local_store;
pub mod months;
pub mod schema;
pub mod stocks;

pub use errors::{Error, Result};
