use std::sync::Arc;

use diesel::prelude::*;
use log::debug;

use crate::budgets::budgets_model::{sort_years, Budget, NewBudget};
use crate::budgets::budgets_traits::BudgetRepositoryTrait;
use crate::db::{get_connection, DbPool};
use crate::errors::{Error, Result, ValidationError};
use crate::schema::{budget_items, budgets};

pub struct BudgetRepository {
    pool: Arc<DbPool>,
}

impl BudgetRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        BudgetRepository { pool }
    }
}

fn find_budget_in(
    conn: &mut SqliteConnection,
    user_id: &str,
    year: &str,
) -> Result<Option<Budget>> {
    let budget = budgets::table
        .filter(budgets::user_id.eq(user_id))
        .filter(budgets::year.eq(year))
        .select(Budget::as_select())
        .first(conn)
        .optional()?;
    Ok(budget)
}

fn insert_budget_in(conn: &mut SqliteConnection, user_id: &str, year: &str) -> Result<Budget> {
    let new_budget = NewBudget::new(user_id, year);
    diesel::insert_into(budgets::table)
        .values(&new_budget)
        .returning(Budget::as_returning())
        .get_result(conn)
        .map_err(|e| {
            if Error::is_unique_violation(&e) {
                Error::Validation(ValidationError::AlreadyExists(format!(
                    "Budget for year {} already exists",
                    year
                )))
            } else {
                Error::from(e)
            }
        })
}

/// Returns the budget for (user, year), creating it when absent.
pub(crate) fn ensure_budget_in(
    conn: &mut SqliteConnection,
    user_id: &str,
    year: &str,
) -> Result<Budget> {
    if let Some(budget) = find_budget_in(conn, user_id, year)? {
        return Ok(budget);
    }
    debug!("Creating budget {} for user {}", year, user_id);
    match insert_budget_in(conn, user_id, year) {
        // Lost a race with a concurrent create; the row is there now.
        Err(Error::Validation(ValidationError::AlreadyExists(_))) => {
            find_budget_in(conn, user_id, year)?
                .ok_or_else(|| Error::NotFound(format!("Budget for year {} not found", year)))
        }
        other => other,
    }
}

impl BudgetRepositoryTrait for BudgetRepository {
    fn list_years(&self, user_id: &str) -> Result<Vec<String>> {
        let mut conn = get_connection(&self.pool)?;
        let mut years = budgets::table
            .filter(budgets::user_id.eq(user_id))
            .select(budgets::year)
            .load::<String>(&mut conn)?;
        sort_years(&mut years);
        Ok(years)
    }

    fn insert_budget(&self, user_id: &str, year: &str) -> Result<Budget> {
        let mut conn = get_connection(&self.pool)?;
        insert_budget_in(&mut conn, user_id, year)
    }

    fn delete_budget(&self, user_id: &str, year: &str) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;
        conn.transaction::<usize, Error, _>(|conn| {
            let items = diesel::delete(
                budget_items::table
                    .filter(budget_items::user_id.eq(user_id))
                    .filter(budget_items::year.eq(year)),
            )
            .execute(conn)?;
            let removed = diesel::delete(
                budgets::table
                    .filter(budgets::user_id.eq(user_id))
                    .filter(budgets::year.eq(year)),
            )
            .execute(conn)?;
            debug!(
                "Deleted budget {} for user {} ({} item rows)",
                year, user_id, items
            );
            Ok(removed)
        })
    }
}
