use std::sync::Arc;

use crate::{auth::UserId, error::ApiResult, main_lib::AppState};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use budgetbook_core::ledger::{build_loan_ledger, LoanPayment};
use budgetbook_core::loans::{Loan, LoanUpdate, NewLoan};
use serde_json::{json, Value};

async fn get_loans(
    State(state): State<Arc<AppState>>,
    user: UserId,
) -> ApiResult<Json<Vec<Loan>>> {
    let loans = state.loan_service.get_loans(user.as_str())?;
    Ok(Json(loans))
}

/// Per-year repayment rows for every loan, derived from the linked budget items.
async fn get_loan_ledger(
    State(state): State<Arc<AppState>>,
    user: UserId,
) -> ApiResult<Json<Vec<LoanPayment>>> {
    let loans = state.loan_service.get_loans(user.as_str())?;
    let items_by_year = state.item_service.get_all_items(user.as_str())?;
    Ok(Json(build_loan_ledger(&loans, &items_by_year)))
}

async fn create_loan(
    State(state): State<Arc<AppState>>,
    user: UserId,
    payload: Result<Json<NewLoan>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Loan>)> {
    let Json(new_loan) = payload?;
    let loan = state
        .loan_service
        .create_loan(user.as_str(), new_loan)
        .await?;
    tracing::info!("Created loan {} for {}", loan.id, user.as_str());
    Ok((StatusCode::CREATED, Json(loan)))
}

async fn update_loan(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    user: UserId,
    payload: Result<Json<LoanUpdate>, JsonRejection>,
) -> ApiResult<Json<Loan>> {
    let Json(update) = payload?;
    let loan = state
        .loan_service
        .update_loan(user.as_str(), &id, update)
        .await?;
    Ok(Json(loan))
}

async fn delete_loan(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    user: UserId,
) -> ApiResult<Json<Value>> {
    state.loan_service.delete_loan(user.as_str(), &id).await?;
    tracing::info!("Deleted loan {} for {}", id, user.as_str());
    Ok(Json(json!({ "success": true })))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/loans", get(get_loans).post(create_loan))
        .route("/loans/ledger", get(get_loan_ledger))
        .route("/loans/:id", put(update_loan).delete(delete_loan))
}
