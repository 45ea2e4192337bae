use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::error::Category;
use thiserror::Error;

use crate::common::types::ErrorResponse;

/// Reasons a signature could not be turned into a signer address.
///
/// These never reach a caller of the verification endpoint; they are folded
/// into a negative `VerificationResult`.
#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("signature must be a 0x-prefixed hex string")]
    MissingPrefix,
    #[error("invalid signature hex: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("invalid signature length: expected 65 bytes, got {0}")]
    InvalidLength(usize),
    #[error("invalid recovery id: {0}")]
    InvalidRecoveryId(u8),
    #[error("signature r/s values are out of range")]
    InvalidComponents,
    #[error("signature s value is not in the lower half of the curve order")]
    HighS,
    #[error("public key recovery failed")]
    RecoveryFailed,
}

/// Errors surfaced by the HTTP layer.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Both message and signature are required")]
    MissingFields,
    #[error("{0}")]
    InvalidBody(String),
    #[error("{0}")]
    MalformedBody(String),
    #[error("No route for {0}")]
    NotFound(String),
    #[error("Method {method} is not allowed on {path}")]
    MethodNotAllowed { method: String, path: String },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingFields | ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::MalformedBody(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    pub fn to_response_body(&self) -> ErrorResponse {
        let error = match self {
            ApiError::MissingFields | ApiError::InvalidBody(_) => "Bad Request",
            ApiError::MalformedBody(_) => "Server Error",
            ApiError::NotFound(_) => "Not Found",
            ApiError::MethodNotAllowed { .. } => "Method Not Allowed",
        };
        ErrorResponse {
            error: error.to_string(),
            message: self.to_string(),
        }
    }

    /// A body that parsed but has the wrong shape is the caller's fault;
    /// anything that is not JSON at all is left as a server error.
    pub fn from_json_error(err: &serde_json::Error) -> Self {
        match err.classify() {
            Category::Data => ApiError::InvalidBody(err.to_string()),
            Category::Syntax | Category::Eof | Category::Io => {
                ApiError::MalformedBody(err.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => ApiError::InvalidBody(err.body_text()),
            other => ApiError::MalformedBody(other.body_text()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, "rejected request");
        }
        (status, Json(self.to_response_body())).into_response()
    }
}
