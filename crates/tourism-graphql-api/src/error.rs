//! # API Error Types
//!
//! Unified error handling for the GraphQL API layer.

use async_graphql::{Error as GraphQLError, ErrorExtensions};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tourism_analytics::AnalyticsError;
use tourism_domain::DomainError;
use tourism_forecast::ForecastError;
use tourism_persistence::PersistenceError;

/// API-level errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Analytics error: {0}")]
    Analytics(#[from] AnalyticsError),

    #[error("Forecast error: {0}")]
    Forecast(#[from] ForecastError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) | Self::Analytics(AnalyticsError::InvalidParameter(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::InvalidConfig(_)
            | Self::Analytics(_)
            | Self::Forecast(_)
            | Self::Persistence(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code for GraphQL extensions
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) | Self::Analytics(AnalyticsError::InvalidParameter(_)) => {
                "INVALID_INPUT"
            }
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Analytics(_) => "ANALYTICS_ERROR",
            Self::Forecast(_) => "FORECAST_ERROR",
            Self::Persistence(_) => "PERSISTENCE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl ErrorExtensions for ApiError {
    fn extend(&self) -> GraphQLError {
        GraphQLError::new(self.to_string()).extend_with(|_, e| {
            e.set("code", self.error_code());
            e.set("status", self.status_code().as_u16());
        })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = serde_json::json!({
            "error": {
                "message": self.to_string(),
                "code": self.error_code(),
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let invalid = ApiError::from(AnalyticsError::InvalidParameter("bad range".into()));
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(invalid.error_code(), "INVALID_INPUT");

        let store = ApiError::from(ForecastError::Model("diverged".into()));
        assert_eq!(store.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(store.error_code(), "FORECAST_ERROR");
    }

    #[test]
    fn test_graphql_extensions() {
        let err = ApiError::InvalidInput("horizonDays must be positive".into()).extend();
        assert_eq!(err.message, "Invalid input: horizonDays must be positive");
        let extensions = err.extensions.unwrap();
        assert_eq!(
            extensions.get("code"),
            Some(&async_graphql::Value::from("INVALID_INPUT"))
        );
    }

    #[test]
    fn test_http_response_status() {
        let response = ApiError::Internal("boom".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
