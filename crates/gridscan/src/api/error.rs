//! API error mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::error::GridscanError;

use super::types::ErrorResponse;

/// A [`GridscanError`] paired with the HTTP status it maps to.
///
/// Caller mistakes (validation, unsupported formats) become 400, everything
/// else 500. The body is always an [`ErrorResponse`].
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: GridscanError,
}

impl ApiError {
    pub fn validation(error: GridscanError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }

    pub fn internal(error: GridscanError) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::validation(GridscanError::validation(message))
    }
}

impl From<GridscanError> for ApiError {
    fn from(error: GridscanError) -> Self {
        if error.is_client_error() {
            Self::validation(error)
        } else {
            Self::internal(error)
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(error_type = self.error.kind(), "Request failed: {}", self.error);
        } else {
            tracing::debug!(error_type = self.error.kind(), "Request rejected: {}", self.error);
        }

        let body = ErrorResponse {
            success: false,
            message: self.error.to_string(),
            error_type: self.error.kind().to_string(),
        };

        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_400() {
        let err: ApiError = GridscanError::validation("bad mode").into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err: ApiError = GridscanError::UnsupportedFormat("application/pdf".into()).into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_engine_errors_map_to_500() {
        let err: ApiError = GridscanError::ocr("engine crashed").into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);

        let io = std::io::Error::other("disk full");
        let err: ApiError = GridscanError::from(io).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = ApiError::bad_request("No image uploaded").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error_type"], "ValidationError");
        assert!(json["message"].as_str().unwrap().contains("No image uploaded"));
    }
}
