use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::error::SanctionsError;

/// Application-level error type that maps to
/// `{success: false, error, message}` responses.
#[derive(Error, Debug)]
pub enum AppError {
    /// Caller sent an invalid request.
    #[error("{0}")]
    Validation(String),

    /// Dataset has never been populated and a refresh failed.
    #[error("{0}")]
    Unavailable(String),

    /// Anything else.
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unavailable(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "Invalid request",
            AppError::Unavailable(_) => "Failed to fetch sanctions data",
            AppError::Internal(_) => "Internal error",
        }
    }
}

impl From<SanctionsError> for AppError {
    fn from(err: SanctionsError) -> Self {
        match err {
            SanctionsError::Validation(message) => AppError::Validation(message),
            SanctionsError::Unavailable(message) => AppError::Unavailable(message),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = serde_json::json!({
            "success": false,
            "error": self.label(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let validation: AppError = SanctionsError::Validation("query missing".to_string()).into();
        assert_eq!(validation.status(), StatusCode::BAD_REQUEST);

        let unavailable: AppError = SanctionsError::Unavailable("no data".to_string()).into();
        assert_eq!(unavailable.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(unavailable.label(), "Failed to fetch sanctions data");

        let other: AppError = SanctionsError::Parse("bad xml".to_string()).into();
        assert!(matches!(other, AppError::Internal(_)));
    }
}
