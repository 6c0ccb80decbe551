use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Slot conflict: {0}")]
    SlotConflict(String),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Internal server error")]
    Internal,
    #[error("Internal server error: {0}")]
    InternalWithMsg(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Database(e) => {
                if let Some(db_err) = e.as_database_error() {
                    let db_code = db_err.code().unwrap_or_default();

                    // 2067 = SQLite unique constraint
                    // 23505 = PostgreSQL unique violation
                    // 23P01 = PostgreSQL exclusion violation (overlapping active bookings)
                    if db_code == "23P01" {
                        return (
                            StatusCode::CONFLICT,
                            Json(json!({
                                "error": "Someone just booked that slot. Please pick another one.",
                                "code": "slot_conflict"
                            })),
                        ).into_response();
                    }
                    if db_code == "2067" || db_code == "23505" {
                        return (
                            StatusCode::CONFLICT,
                            Json(json!({ "error": "Resource already exists (duplicate entry)" })),
                        ).into_response();
                    }
                }

                error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, None, "Internal server error".to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, None, msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, None, "Unauthorized".to_string()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, None, msg.clone()),
            AppError::SlotConflict(msg) => (StatusCode::CONFLICT, Some("slot_conflict"), msg.clone()),
            AppError::InvalidTransition(msg) => {
                (StatusCode::CONFLICT, Some("invalid_transition"), msg.clone())
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, None, msg.clone()),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, None, "Internal error".to_string()),
            AppError::InternalWithMsg(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, None, "Internal error".to_string())
            }
        };

        let body = match code {
            Some(code) => Json(json!({ "error": message, "code": code })),
            None => Json(json!({ "error": message })),
        };

        (status, body).into_response()
    }
}
