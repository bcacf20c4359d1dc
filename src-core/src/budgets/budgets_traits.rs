use async_trait::async_trait;

use crate::budgets::budgets_model::{Budget, BudgetsChanged};
use crate::errors::Result;

pub trait BudgetRepositoryTrait: Send + Sync {
    fn list_years(&self, user_id: &str) -> Result<Vec<String>>;
    /// Inserts a budget row; fails with `ValidationError::AlreadyExists` on a duplicate.
    fn insert_budget(&self, user_id: &str, year: &str) -> Result<Budget>;
    /// Deletes the budget and its line items. Returns the number of budgets removed.
    fn delete_budget(&self, user_id: &str, year: &str) -> Result<usize>;
}

#[async_trait]
pub trait BudgetServiceTrait: Send + Sync {
    fn list_years(&self, user_id: &str) -> Result<Vec<String>>;
    async fn create_year(&self, user_id: &str, year: &str) -> Result<BudgetsChanged>;
    async fn delete_year(&self, user_id: &str, year: &str) -> Result<BudgetsChanged>;
}
