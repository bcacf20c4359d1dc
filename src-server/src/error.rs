use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use budgetbook_core::errors::Error as CoreError;
use serde_json::json;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ApiError::Core(err) => match err {
                CoreError::Validation(inner) => (StatusCode::BAD_REQUEST, inner.to_string()),
                CoreError::Formula(inner) => (StatusCode::BAD_REQUEST, inner.to_string()),
                CoreError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
                CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
                other => {
                    tracing::error!("Request failed: {}", other);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                    )
                }
            },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use budgetbook_core::errors::{DatabaseError, ValidationError};

    #[test]
    fn core_errors_map_to_status_codes() {
        let cases = vec![
            (
                ApiError::from(CoreError::Validation(ValidationError::AlreadyExists(
                    "Budget for year 2025 already exists".into(),
                ))),
                StatusCode::BAD_REQUEST,
                "Budget for year 2025 already exists",
            ),
            (
                ApiError::from(CoreError::NotFound("Loan not found".into())),
                StatusCode::NOT_FOUND,
                "Loan not found",
            ),
            (
                ApiError::Unauthorized("Missing user id".into()),
                StatusCode::UNAUTHORIZED,
                "Missing user id",
            ),
            (
                ApiError::from(CoreError::Database(DatabaseError::Pool("timed out".into()))),
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
            ),
        ];
        for (err, status, message) in cases {
            assert_eq!(err.status_and_message(), (status, message.to_string()));
        }
    }
}
