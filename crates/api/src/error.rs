//! Error responses.
//!
//! Every failure leaves the API as `{"error": code, "message": text}` with
//! the status of the underlying domain error. Internal failures are logged
//! and answered with a generic message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use claimflow_core::cost_type::CatalogError;
use claimflow_core::expense::ExpenseError;
use claimflow_core::export::ExportError;
use claimflow_shared::AppError;

/// An error response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    /// Builds an error response; `category` decides whether the message
    /// may be shown.
    fn new(status: u16, code: &'static str, message: String, category: &AppError) -> Self {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let message = match category {
            AppError::Internal(_) | AppError::ExternalService(_) => {
                tracing::error!(code, error = %message, "Request failed");
                "An internal error occurred".to_string()
            }
            _ => message,
        };
        Self {
            status,
            code,
            message,
        }
    }

    /// 400 with a request-level validation message.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::from(AppError::Validation(message.into()))
    }

    /// HTTP status of the response.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        let message = match &err {
            AppError::Unauthorized(m)
            | AppError::Forbidden(m)
            | AppError::UnauthorizedTransition(m)
            | AppError::NotFound(m)
            | AppError::Validation(m)
            | AppError::Conflict(m)
            | AppError::ExportArtifact(m)
            | AppError::ExternalService(m)
            | AppError::Internal(m) => m.clone(),
        };
        Self::new(err.status_code(), err.error_code(), message, &err)
    }
}

impl From<ExpenseError> for ApiError {
    fn from(err: ExpenseError) -> Self {
        let (status, code, message) = (err.status_code(), err.error_code(), err.to_string());
        Self::new(status, code, message, &AppError::from(err))
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        let (status, code, message) = (err.status_code(), err.error_code(), err.to_string());
        Self::new(status, code, message, &AppError::from(err))
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        Self::from(ExpenseError::from(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({
                "error": self.code,
                "message": self.message
            })),
        )
            .into_response()
    }
}
