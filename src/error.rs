use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::{
    db::StoreError,
    services::{notification_service::NotifyError, payment_service::PaymentError},
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Forbidden")]
    Forbidden,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error(transparent)]
    Notify(#[from] NotifyError),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Turn a store miss into a labelled 404, keep everything else.
    pub fn from_store(err: StoreError, label: &'static str) -> Self {
        if err.is_not_found() {
            AppError::NotFound(label)
        } else {
            AppError::Store(err)
        }
    }

    pub fn missing_fields() -> Self {
        AppError::BadRequest("Required fields missing".to_string())
    }
}

/// Body of every non-2xx response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
            AppError::Store(StoreError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, "Not found".to_string())
            }
            AppError::Store(StoreError::Connection(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database connection failed".to_string(),
            ),
            AppError::Store(StoreError::Encode(_)) | AppError::Store(StoreError::Decode(_)) => (
                StatusCode::BAD_REQUEST,
                "Invalid document".to_string(),
            ),
            AppError::Store(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error".to_string(),
            ),
            AppError::Payment(PaymentError::InvalidSignature) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            AppError::Payment(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Payment gateway error".to_string(),
            ),
            AppError::Notify(_) | AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error".to_string(),
            ),
        };

        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        }

        (status, axum::Json(ErrorBody { error: message })).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Collection;

    #[test]
    fn store_not_found_becomes_labelled_404() {
        let err = AppError::from_store(
            StoreError::NotFound {
                collection: Collection::Products,
            },
            "Product",
        );
        assert_eq!(err.to_string(), "Product not found");
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn missing_fields_is_a_400() {
        let response = AppError::missing_fields().into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
