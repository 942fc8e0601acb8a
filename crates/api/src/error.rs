//! API Error Mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use form_session::SessionError;
use materiality_core::CalculationError;
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced to API clients
#[derive(Debug, Error)]
pub enum ApiError {
    /// Calculation rejected the request or produced no result
    #[error(transparent)]
    Calculation(#[from] CalculationError),

    /// Request carries more indicators than the service accepts
    #[error("At most {max} indicators are accepted")]
    TooManyIndicators { max: usize },

    /// Form session could not be claimed
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Path segment is not a session token
    #[error("Session not found")]
    InvalidToken,
}

/// JSON error body
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Calculation(CalculationError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Calculation(CalculationError::NoRepresentativeIndicators { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::TooManyIndicators { .. } => StatusCode::BAD_REQUEST,
            ApiError::Session(SessionError::NotFound) => StatusCode::NOT_FOUND,
            ApiError::Session(SessionError::Expired) => StatusCode::GONE,
            ApiError::Session(SessionError::AlreadyUsed) => StatusCode::FORBIDDEN,
            ApiError::Session(SessionError::Store(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InvalidToken => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use materiality_core::ValidationError;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err = ApiError::Calculation(ValidationError::EmptyIndicators.into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_all_excluded_maps_to_unprocessable() {
        let err =
            ApiError::Calculation(CalculationError::NoRepresentativeIndicators {
                excluded_count: 3,
            });
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_session_status_codes() {
        assert_eq!(
            ApiError::Session(SessionError::NotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Session(SessionError::Expired).status(),
            StatusCode::GONE
        );
        assert_eq!(
            ApiError::Session(SessionError::AlreadyUsed).status(),
            StatusCode::FORBIDDEN
        );
    }
}
