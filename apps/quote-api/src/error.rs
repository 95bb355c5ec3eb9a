//! Error types for the Quote API.
//!
//! Every failure leaves the server as `{"code": "...", "message": "..."}`.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ErrorKind / source              HTTP   code                            │
//! │  ──────────────────────────────  ─────  ──────────────────────────────  │
//! │  NotFound                        404    NOT_FOUND                       │
//! │  Validation (incl. bad JSON)     400    VALIDATION_ERROR                │
//! │  JustificationRequired           422    JUSTIFICATION_REQUIRED          │
//! │  InvalidStateTransition          409    INVALID_STATE_TRANSITION        │
//! │  missing x-staff-id              401    UNAUTHORIZED                    │
//! │  storage failure                 500    INTERNAL_ERROR (detail logged)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use printwise_core::ErrorKind;
use printwise_db::ServiceError;
use serde::Serialize;
use tracing::error;

/// Wire shape of an error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

/// Quote API errors.
#[derive(Debug, thiserror::Error)]
#[error("{code}: {message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        ApiError {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
    }

    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "internal server error",
        )
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let (status, code) = match err.kind() {
            Some(ErrorKind::NotFound) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Some(ErrorKind::Validation) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            Some(ErrorKind::JustificationRequired) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "JUSTIFICATION_REQUIRED")
            }
            Some(ErrorKind::InvalidStateTransition) => {
                (StatusCode::CONFLICT, "INVALID_STATE_TRANSITION")
            }
            None => {
                error!(error = %err, "Storage failure");
                return ApiError::internal();
            }
        };

        ApiError::new(status, code, err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                code: self.code,
                message: self.message,
            }),
        )
            .into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use printwise_core::{CoreError, QuoteAction, QuoteStatus, ValidationError};
    use printwise_db::DbError;

    #[test]
    fn test_status_mapping() {
        let cases: Vec<(ServiceError, StatusCode, &str)> = vec![
            (
                CoreError::QuoteNotFound("7".into()).into(),
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
            ),
            (
                ValidationError::MustBePositive {
                    field: "quantity".into(),
                }
                .into(),
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
            ),
            (
                CoreError::InvalidStateTransition {
                    from: QuoteStatus::Approved,
                    action: QuoteAction::Approve,
                }
                .into(),
                StatusCode::CONFLICT,
                "INVALID_STATE_TRANSITION",
            ),
        ];

        for (err, status, code) in cases {
            let api = ApiError::from(err);
            assert_eq!(api.status, status);
            assert_eq!(api.code, code);
        }
    }

    #[test]
    fn test_storage_detail_is_hidden() {
        let err: ServiceError = DbError::QueryFailed("disk I/O error at /var/lib".into()).into();
        let api = ApiError::from(err);

        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.message.contains("/var/lib"));
    }
}
