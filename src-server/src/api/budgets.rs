use std::sync::Arc;

use crate::{auth::UserId, error::ApiResult, main_lib::AppState};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{delete, get},
    Json, Router,
};
use budgetbook_core::budgets::BudgetsChanged;
use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize)]
struct CreateBudgetRequest {
    #[serde(default)]
    year: Value,
}

impl CreateBudgetRequest {
    /// Accepts `"2025"` as well as `2025`; anything else reads as missing.
    fn year(&self) -> String {
        match &self.year {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => String::new(),
        }
    }
}

async fn list_budgets(
    State(state): State<Arc<AppState>>,
    user: UserId,
) -> ApiResult<Json<Vec<String>>> {
    let years = state.budget_service.list_years(user.as_str())?;
    Ok(Json(years))
}

async fn create_budget(
    State(state): State<Arc<AppState>>,
    user: UserId,
    payload: Result<Json<CreateBudgetRequest>, JsonRejection>,
) -> ApiResult<Json<BudgetsChanged>> {
    let Json(request) = payload?;
    let changed = state
        .budget_service
        .create_year(user.as_str(), &request.year())
        .await?;
    tracing::info!("Created budget {} for {}", request.year(), user.as_str());
    Ok(Json(changed))
}

async fn delete_budget(
    Path(year): Path<String>,
    State(state): State<Arc<AppState>>,
    user: UserId,
) -> ApiResult<Json<BudgetsChanged>> {
    let changed = state.budget_service.delete_year(user.as_str(), &year).await?;
    tracing::info!("Deleted budget {} for {}", year, user.as_str());
    Ok(Json(changed))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/budgets", get(list_budgets).post(create_budget))
        .route("/budgets/:year", delete(delete_budget))
}
