use std::collections::BTreeMap;
use std::sync::Arc;

use diesel::prelude::*;
use log::debug;

use crate::budget_items::budget_items_model::{BudgetItemDB, LineItem, NewBudgetItemDB};
use crate::budget_items::budget_items_traits::BudgetItemRepositoryTrait;
use crate::budgets::budgets_repository::ensure_budget_in;
use crate::db::{get_connection, DbPool};
use crate::errors::{Error, Result};
use crate::schema::budget_items;

pub struct BudgetItemRepository {
    pool: Arc<DbPool>,
}

impl BudgetItemRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        BudgetItemRepository { pool }
    }
}

impl BudgetItemRepositoryTrait for BudgetItemRepository {
    fn load_items(&self, user_id: &str, year: &str) -> Result<Vec<LineItem>> {
        let mut conn = get_connection(&self.pool)?;
        let budget = ensure_budget_in(&mut conn, user_id, year)?;
        let rows = budget_items::table
            .filter(budget_items::budget_id.eq(&budget.id))
            .order((budget_items::position.asc(), budget_items::id.asc()))
            .select(BudgetItemDB::as_select())
            .load::<BudgetItemDB>(&mut conn)?;
        Ok(rows.into_iter().map(LineItem::from).collect())
    }

    fn replace_items(&self, user_id: &str, year: &str, items: &[LineItem]) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;
        conn.transaction::<usize, Error, _>(|conn| {
            let budget = ensure_budget_in(conn, user_id, year)?;
            let removed = diesel::delete(
                budget_items::table
                    .filter(budget_items::user_id.eq(user_id))
                    .filter(budget_items::year.eq(year)),
            )
            .execute(conn)?;

            let rows: Vec<NewBudgetItemDB> = items
                .iter()
                .enumerate()
                .map(|(position, item)| {
                    NewBudgetItemDB::from_item(item, &budget.id, user_id, year, position as i32)
                })
                .collect();
            let inserted = if rows.is_empty() {
                0
            } else {
                diesel::insert_into(budget_items::table)
                    .values(&rows)
                    .execute(conn)?
            };

            debug!(
                "Replaced {} item(s) with {} for user {} year {}",
                removed, inserted, user_id, year
            );
            Ok(inserted)
        })
    }

    fn load_all_items(&self, user_id: &str) -> Result<BTreeMap<String, Vec<LineItem>>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = budget_items::table
            .filter(budget_items::user_id.eq(user_id))
            .order((
                budget_items::year.asc(),
                budget_items::position.asc(),
                budget_items::id.asc(),
            ))
            .select(BudgetItemDB::as_select())
            .load::<BudgetItemDB>(&mut conn)?;

        let mut by_year: BTreeMap<String, Vec<LineItem>> = BTreeMap::new();
        for row in rows {
            by_year
                .entry(row.year.clone())
                .or_default()
                .push(LineItem::from(row));
        }
        Ok(by_year)
    }
}
