use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::query::FieldError;

/// Error body for validation failures: a list of field-level messages.
#[derive(Debug, Serialize, ToSchema)]
pub struct ValidationErrorResponse {
    pub errors: Vec<FieldErrorBody>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FieldErrorBody {
    pub field: String,
    pub message: String,
}

/// Standard error response body for non-validation failures.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
}

/// The error kinds the prediction pipeline can surface, plus the ambient
/// database failure mode the rest of this crate's persistence layer can raise.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("invalid input")]
    InvalidInput(Vec<FieldError>),

    /// The weather or elevation provider was exhausted after retries.
    /// Weather failures only reach here when route weather could not be
    /// obtained at all (per-accident windows degrade locally instead);
    /// elevation failures never surface this variant.
    #[error("upstream service unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Database or cache connection pool exhausted, and a single retry at
    /// the orchestrator did not recover it.
    #[error("resource unavailable: {0}")]
    ResourceUnavailable(String),

    /// The per-request deadline elapsed at a suspension point.
    #[error("request timed out")]
    Timeout,

    /// A kernel produced NaN, or a matrix lookup failed in a way that
    /// indicates a bug. Normally caught and logged at the call site so the
    /// offending accident is simply dropped; this variant is for the rare
    /// case that isn't locally recoverable.
    #[error("internal inconsistency: {0}")]
    InternalInconsistency(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::InvalidInput(fields) => {
                let body = ValidationErrorResponse {
                    errors: fields
                        .into_iter()
                        .map(|f| FieldErrorBody {
                            field: f.field,
                            message: f.message,
                        })
                        .collect(),
                };
                (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
            }
            AppError::UpstreamUnavailable(msg) => {
                tracing::warn!("upstream unavailable: {msg}");
                (StatusCode::SERVICE_UNAVAILABLE, Json(ErrorResponse { error: msg })).into_response()
            }
            AppError::ResourceUnavailable(msg) => {
                tracing::warn!("resource unavailable: {msg}");
                (StatusCode::SERVICE_UNAVAILABLE, Json(ErrorResponse { error: msg })).into_response()
            }
            AppError::Timeout => (
                StatusCode::GATEWAY_TIMEOUT,
                Json(ErrorResponse {
                    error: "request timed out".to_string(),
                }),
            )
                .into_response(),
            AppError::InternalInconsistency(msg) => {
                tracing::error!("internal inconsistency: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: "internal error".to_string(),
                    }),
                )
                    .into_response()
            }
            AppError::Database(err) => {
                tracing::error!("database error: {err:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: "internal database error".to_string(),
                    }),
                )
                    .into_response()
            }
        }
    }
}
