use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tessera_core::AppError;
use tracing::{error, warn};

mod types;

use types::ErrorResponse;

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0 {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Duplicate(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) | AppError::CrossTenant(_) => StatusCode::NOT_FOUND,
            AppError::Unauthenticated(_) | AppError::SessionUnavailable(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Inactive(_) | AppError::Unauthorized(_) => StatusCode::FORBIDDEN,
            AppError::InvalidCode | AppError::Expired | AppError::AlreadyUsed => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn payload(&self) -> ErrorResponse {
        match &self.0 {
            // Both tenancy denials share one body.
            error if error.is_tenancy_denial() => ErrorResponse::new(
                tessera_core::ErrorKind::NotFound.as_str(),
                "resource not found".to_owned(),
            ),
            AppError::Internal(_) => {
                ErrorResponse::new(self.0.kind().as_str(), "internal server error".to_owned())
            }
            other => ErrorResponse::new(other.kind().as_str(), other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self.0 {
            AppError::Internal(message) => error!(error = %message, "request failed"),
            AppError::SessionUnavailable(_)
            | AppError::Unauthenticated(_)
            | AppError::Inactive(_)
            | AppError::Unauthorized(_)
            | AppError::CrossTenant(_) => {
                warn!(kind = self.0.kind().as_str(), error = %self.0, "request denied");
            }
            _ => {}
        }

        (status, Json(self.payload())).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;
