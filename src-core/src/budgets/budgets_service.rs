use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use crate::budgets::budgets_model::BudgetsChanged;
use crate::budgets::budgets_traits::{BudgetRepositoryTrait, BudgetServiceTrait};
use crate::errors::{Error, Result};

pub struct BudgetService<T: BudgetRepositoryTrait> {
    budget_repo: Arc<T>,
}

impl<T: BudgetRepositoryTrait> BudgetService<T> {
    pub fn new(budget_repo: Arc<T>) -> Self {
        BudgetService { budget_repo }
    }
}

/// Trims a year string and rejects blanks.
pub fn validate_year(year: &str) -> Result<String> {
    let trimmed = year.trim();
    if trimmed.is_empty() {
        return Err(Error::missing_field("year"));
    }
    if trimmed.contains('/') {
        return Err(Error::invalid_input(format!("Invalid year '{}'", trimmed)));
    }
    Ok(trimmed.to_string())
}

#[async_trait]
impl<T: BudgetRepositoryTrait> BudgetServiceTrait for BudgetService<T> {
    fn list_years(&self, user_id: &str) -> Result<Vec<String>> {
        self.budget_repo.list_years(user_id)
    }

    async fn create_year(&self, user_id: &str, year: &str) -> Result<BudgetsChanged> {
        let year = validate_year(year)?;
        self.budget_repo.insert_budget(user_id, &year)?;
        debug!("Created budget {} for user {}", year, user_id);
        Ok(BudgetsChanged::new(self.budget_repo.list_years(user_id)?))
    }

    async fn delete_year(&self, user_id: &str, year: &str) -> Result<BudgetsChanged> {
        let removed = self.budget_repo.delete_budget(user_id, year.trim())?;
        if removed == 0 {
            return Err(Error::NotFound(format!("Budget for year {} not found", year)));
        }
        Ok(BudgetsChanged::new(self.budget_repo.list_years(user_id)?))
    }
}
