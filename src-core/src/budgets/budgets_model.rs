use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// A budget year owned by one user.
#[derive(
    Queryable, Identifiable, Selectable, Debug, Clone, PartialEq, Serialize, Deserialize,
)]
#[diesel(table_name = crate::schema::budgets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: String,
    pub user_id: String,
    pub year: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::budgets)]
pub struct NewBudget {
    pub id: String,
    pub user_id: String,
    pub year: String,
    pub created_at: NaiveDateTime,
}

impl NewBudget {
    pub fn new(user_id: &str, year: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            year: year.to_string(),
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}

/// Response body for budget mutations: the caller's full, ordered year list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetsChanged {
    pub success: bool,
    pub budgets: Vec<String>,
}

impl BudgetsChanged {
    pub fn new(budgets: Vec<String>) -> Self {
        Self {
            success: true,
            budgets,
        }
    }
}

/// Orders year strings numerically when both parse as integers, lexically otherwise.
pub fn compare_years(a: &str, b: &str) -> std::cmp::Ordering {
    match (a.trim().parse::<i64>(), b.trim().parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        _ => a.cmp(b),
    }
}

pub fn sort_years(years: &mut [String]) {
    years.sort_by(|a, b| compare_years(a, b));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn years_sort_numerically() {
        let mut years = vec!["2025".to_string(), "999".to_string(), "2024".to_string()];
        sort_years(&mut years);
        assert_eq!(years, vec!["999", "2024", "2025"]);
    }

    #[test]
    fn non_numeric_years_sort_lexically() {
        let mut years = vec!["b".to_string(), "2024".to_string(), "a".to_string()];
        sort_years(&mut years);
        assert_eq!(years, vec!["2024", "a", "b"]);
    }
}
