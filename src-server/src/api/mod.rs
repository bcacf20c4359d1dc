use std::sync::Arc;

use axum::Router;

use crate::main_lib::AppState;

pub mod budget_items;
pub mod budgets;
pub mod loans;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(budgets::router())
        .merge(budget_items::router())
        .merge(loans::router())
}
