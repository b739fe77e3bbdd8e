use actix_web::http::header;
use actix_web::HttpResponse;
use thiserror::Error;

use crate::domain::errors::DomainError;

/// HTTP-facing error type. Mirrors the domain taxonomy one-to-one and owns
/// the status-code mapping; handlers only ever bubble these up.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid order data")]
    Validation(Vec<String>),

    #[error("Too many orders. Retry in {retry_after} seconds.")]
    RateLimited { retry_after: u64 },

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    FailedPrecondition(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation(errors) => AppError::Validation(errors),
            DomainError::RateLimited { retry_after } => AppError::RateLimited { retry_after },
            DomainError::NotFound(msg) => AppError::NotFound(msg),
            DomainError::FailedPrecondition(msg) => AppError::FailedPrecondition(msg),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Validation(errors) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": self.to_string(),
                "errors": errors,
            })),
            AppError::RateLimited { retry_after } => HttpResponse::TooManyRequests()
                .insert_header((header::RETRY_AFTER, retry_after.to_string()))
                .json(serde_json::json!({
                    "error": self.to_string(),
                    "retryAfter": retry_after,
                })),
            AppError::NotFound(_) => HttpResponse::NotFound().json(serde_json::json!({
                "error": self.to_string()
            })),
            AppError::FailedPrecondition(_) => HttpResponse::Conflict().json(serde_json::json!({
                "error": self.to_string()
            })),
            AppError::Internal(detail) => {
                // Full detail stays server-side; the client gets a generic
                // message.
                log::error!("Internal error: {detail}");
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Internal server error"
                }))
            }
        }
    }
}
