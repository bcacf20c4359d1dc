use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::budget_items::budget_items_model::LineItem;
use crate::errors::Result;

pub trait BudgetItemRepositoryTrait: Send + Sync {
    /// Items of (user, year) in stored order. Creates the budget row if absent.
    fn load_items(&self, user_id: &str, year: &str) -> Result<Vec<LineItem>>;
    /// Replaces every item of (user, year) with `items` in one transaction.
    fn replace_items(&self, user_id: &str, year: &str, items: &[LineItem]) -> Result<usize>;
    /// All of a user's items grouped by year.
    fn load_all_items(&self, user_id: &str) -> Result<BTreeMap<String, Vec<LineItem>>>;
}

#[async_trait]
pub trait BudgetItemServiceTrait: Send + Sync {
    fn get_items(&self, user_id: &str, year: &str) -> Result<Vec<LineItem>>;
    async fn save_items(&self, user_id: &str, year: &str, items: Vec<LineItem>) -> Result<usize>;
    fn get_all_items(&self, user_id: &str) -> Result<BTreeMap<String, Vec<LineItem>>>;
}
