//! Error handling for the HTTP layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

/// Headline reported for every failed lookup against the catalog.
pub const SCRAPE_FAILURE_MESSAGE: &str = "Failed to fetch or parse library data.";

/// JSON body returned for every HTTP error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable error message
    pub error: String,
    /// Underlying cause, present on server-side failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing {name} parameter")]
    MissingParameter { name: &'static str },

    #[error("Invalid query string: {message}")]
    InvalidQuery { message: String },

    #[error("Library server responded with status: {status}")]
    Upstream { status: u16 },

    #[error(transparent)]
    Scrape(#[from] anyhow::Error),
}

impl AppError {
    /// Create a missing parameter error for the named query parameter
    pub fn missing_parameter(name: &'static str) -> Self {
        Self::MissingParameter { name }
    }

    /// Create an error for a query string that could not be decoded
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            message: message.into(),
        }
    }

    /// Create an upstream error carrying the catalog's status code
    pub fn upstream(status: u16) -> Self {
        Self::Upstream { status }
    }

    /// Stable machine-readable code, used in logs
    pub fn code(&self) -> &'static str {
        match self {
            AppError::MissingParameter { .. } => "missing_parameter",
            AppError::InvalidQuery { .. } => "invalid_query",
            AppError::Upstream { .. } => "upstream_error",
            AppError::Scrape(_) => "scrape_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingParameter { .. } | AppError::InvalidQuery { .. } => {
                StatusCode::BAD_REQUEST
            }
            AppError::Upstream { .. } | AppError::Scrape(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Body rendered for this error
    pub fn body(&self) -> ErrorBody {
        match self {
            AppError::MissingParameter { .. } | AppError::InvalidQuery { .. } => ErrorBody {
                error: self.to_string(),
                details: None,
            },
            AppError::Upstream { .. } | AppError::Scrape(_) => ErrorBody {
                error: SCRAPE_FAILURE_MESSAGE.to_string(),
                details: Some(self.to_string()),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4();
        let status = self.status_code();
        let body = self.body();

        if status.is_server_error() {
            tracing::error!(
                error_id = %error_id,
                error_code = self.code(),
                status_code = %status.as_u16(),
                details = body.details.as_deref().unwrap_or_default(),
                "Scraping error"
            );
        } else {
            tracing::warn!(
                error_id = %error_id,
                error_code = self.code(),
                status_code = %status.as_u16(),
                "Request error"
            );
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_missing_parameter_response() {
        let response = AppError::missing_parameter("bookTitle").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "error": "Missing bookTitle parameter" })
        );
    }

    #[tokio::test]
    async fn test_invalid_query_response() {
        let response = AppError::invalid_query("bad escape").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "error": "Invalid query string: bad escape" })
        );
    }

    #[tokio::test]
    async fn test_upstream_response_carries_status() {
        let response = AppError::upstream(503).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({
                "error": "Failed to fetch or parse library data.",
                "details": "Library server responded with status: 503"
            })
        );
    }

    #[tokio::test]
    async fn test_scrape_response_keeps_details() {
        let error = AppError::from(anyhow::anyhow!("connection reset"));
        assert_eq!(error.code(), "scrape_error");

        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], SCRAPE_FAILURE_MESSAGE);
        assert_eq!(body["details"], "connection reset");
    }

    #[test]
    fn test_error_body_omits_absent_details() {
        let body = ErrorBody {
            error: "Missing bookTitle parameter".to_string(),
            details: None,
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"error":"Missing bookTitle parameter"}"#
        );
    }
}
