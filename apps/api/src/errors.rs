use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::billing::BillingError;
use crate::generation::gateway::GenerationError;
use crate::models::user::PlanTier;
use crate::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Provider failures (model, billing, database) surface the provider's own message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not authorized")]
    Unauthorized,

    #[error("{feature} requires the {required} plan or higher")]
    PlanRequired {
        feature: &'static str,
        required: PlanTier,
    },

    #[error("Database error: {0}")]
    Database(#[from] StoreError),

    #[error("{0}")]
    Generation(#[from] GenerationError),

    #[error("Billing error: {0}")]
    Billing(#[from] BillingError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::PlanRequired { .. } => (StatusCode::FORBIDDEN, "PLAN_REQUIRED"),
            AppError::Database(StoreError::Constraint(e)) => {
                tracing::warn!("Constraint violation: {e}");
                (StatusCode::CONFLICT, "CONSTRAINT_VIOLATION")
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR")
            }
            AppError::Generation(e) => {
                tracing::error!("Generation error: {e}");
                (StatusCode::BAD_GATEWAY, "GENERATION_FAILED")
            }
            AppError::Billing(e) => {
                tracing::error!("Billing error: {e}");
                (StatusCode::BAD_GATEWAY, "BILLING_ERROR")
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let message = match &self {
            AppError::Internal(_) => "An internal server error occurred".to_string(),
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
