use std::sync::Arc;

use crate::{
    auth::UserId,
    error::{ApiError, ApiResult},
    main_lib::AppState,
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::get,
    Json, Router,
};
use budgetbook_core::budget_items::LineItem;
use serde_json::{json, Value};

async fn get_items(
    Path(year): Path<String>,
    State(state): State<Arc<AppState>>,
    user: UserId,
) -> ApiResult<Json<Vec<LineItem>>> {
    let items = state.item_service.get_items(user.as_str(), &year)?;
    Ok(Json(items))
}

/// Reads `{"items": [...]}`. Each element goes through the legacy-aware item
/// decoder, so bad entries are reported by index.
fn parse_items(body: Value) -> ApiResult<Vec<LineItem>> {
    let raw = match body {
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(items)) => items,
            _ => return Err(ApiError::BadRequest("items must be an array".to_string())),
        },
        _ => return Err(ApiError::BadRequest("items must be an array".to_string())),
    };

    raw.into_iter()
        .enumerate()
        .map(|(index, value)| {
            serde_json::from_value::<LineItem>(value).map_err(|e| {
                ApiError::BadRequest(format!("Invalid item at index {}: {}", index, e))
            })
        })
        .collect()
}

async fn save_items(
    Path(year): Path<String>,
    State(state): State<Arc<AppState>>,
    user: UserId,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(body) = payload?;
    let items = parse_items(body)?;
    let saved = state
        .item_service
        .save_items(user.as_str(), &year, items)
        .await?;
    tracing::debug!("Saved {} item(s) of {} for {}", saved, year, user.as_str());
    Ok(Json(json!({ "success": true })))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/budgets/:year/data", get(get_items).put(save_items))
}
