use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::budget_items::budget_items_model::LineItem;
use crate::budget_items::budget_items_traits::{BudgetItemRepositoryTrait, BudgetItemServiceTrait};
use crate::budgets::budgets_service::validate_year;
use crate::errors::Result;

pub struct BudgetItemService<T: BudgetItemRepositoryTrait> {
    item_repo: Arc<T>,
}

impl<T: BudgetItemRepositoryTrait> BudgetItemService<T> {
    pub fn new(item_repo: Arc<T>) -> Self {
        BudgetItemService { item_repo }
    }
}

#[async_trait]
impl<T: BudgetItemRepositoryTrait> BudgetItemServiceTrait for BudgetItemService<T> {
    fn get_items(&self, user_id: &str, year: &str) -> Result<Vec<LineItem>> {
        let year = validate_year(year)?;
        self.item_repo.load_items(user_id, &year)
    }

    async fn save_items(
        &self,
        user_id: &str,
        year: &str,
        mut items: Vec<LineItem>,
    ) -> Result<usize> {
        let year = validate_year(year)?;
        for item in &mut items {
            item.normalize();
        }
        self.item_repo.replace_items(user_id, &year, &items)
    }

    fn get_all_items(&self, user_id: &str) -> Result<BTreeMap<String, Vec<LineItem>>> {
        self.item_repo.load_all_items(user_id)
    }
}
