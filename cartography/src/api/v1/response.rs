//! # V1 response envelope
//!
//! Every v1 endpoint answers with an [`ApiResponse<T>`]:
//!
//! ```json
//! {
//!   "data": { ... },                                   // on success
//!   "error": { "code": "not_found", "message": "..." } // on failure
//! }
//! ```
//!
//! Exactly one of `data` and `error` is present.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::CartographyError;

/// Machine-readable error code, serialized in snake_case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Malformed body, bad query parameters or invalid ids. HTTP 400.
    InvalidRequest,
    /// HTTP 404.
    NotFound,
    /// The hub API could not be reached or refused the request. HTTP 502.
    UpstreamError,
    /// Anything else. Details stay in the server log. HTTP 500.
    InternalError,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::UpstreamError => StatusCode::BAD_GATEWAY,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequest => write!(f, "invalid_request"),
            Self::NotFound => write!(f, "not_found"),
            Self::UpstreamError => write!(f, "upstream_error"),
            Self::InternalError => write!(f, "internal_error"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    /// Safe to show to end users.
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// HTTP 200.
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            status: StatusCode::OK,
        }
    }

    /// HTTP 201.
    pub fn created(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            status: StatusCode::CREATED,
        }
    }

    /// Error response; the status follows from `code`.
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
            status: code.status(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status;
        match serde_json::to_value(&self) {
            Ok(body) => (status, Json(body)).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize v1 response");
                let body = serde_json::json!({
                    "error": {
                        "code": ErrorCode::InternalError,
                        "message": "An internal error occurred"
                    }
                });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

impl<T: Serialize> From<CartographyError> for ApiResponse<T> {
    /// Internal failures are logged and answered with a generic message.
    fn from(err: CartographyError) -> Self {
        match err {
            CartographyError::NotFound(msg) => ApiResponse::error(ErrorCode::NotFound, msg),

            CartographyError::Validation(msg) => ApiResponse::error(ErrorCode::InvalidRequest, msg),

            CartographyError::Json(e) => {
                ApiResponse::error(ErrorCode::InvalidRequest, format!("Invalid JSON: {e}"))
            }

            ref upstream @ (CartographyError::Hub(_)
            | CartographyError::HubStatus { .. }
            | CartographyError::Http(_)) => {
                tracing::warn!(error = %upstream, "Hub failure mapped to v1 response");
                ApiResponse::error(ErrorCode::UpstreamError, "The hub API request failed")
            }

            ref internal @ (CartographyError::Io(_) | CartographyError::UrlParse(_)) => {
                tracing::error!(error = %internal, "Internal error mapped to v1 response");
                ApiResponse::error(ErrorCode::InternalError, "An internal error occurred")
            }
        }
    }
}
