use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::error::ApiError;

/// Body of `POST /verify-signature`.
///
/// Both fields are optional at the parsing level so that a missing key (or a
/// JSON `null`) can be told apart from an empty string.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct VerificationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl VerificationRequest {
    pub fn new(message: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            signature: Some(signature.into()),
        }
    }

    pub fn into_parts(self) -> Result<(String, String), ApiError> {
        match (self.message, self.signature) {
            (Some(message), Some(signature)) => Ok((message, signature)),
            _ => Err(ApiError::MissingFields),
        }
    }
}

/// Outcome of recovering a signer from a message and signature.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub is_valid: bool,
    pub signer: String,
    pub original_message: String,
}

impl VerificationResult {
    pub fn valid(signer: String, message: &str) -> Self {
        Self {
            is_valid: true,
            signer,
            original_message: message.to_string(),
        }
    }

    pub fn invalid(message: &str) -> Self {
        Self {
            is_valid: false,
            signer: String::new(),
            original_message: message.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// A message signed by the local wallet, as kept in the holder's history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedMessage {
    pub id: Uuid,
    pub message: String,
    pub signature: String,
    /// Unix time in milliseconds.
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signer: Option<String>,
}

impl SignedMessage {
    pub fn new(message: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            message: message.into(),
            signature: signature.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            verified: None,
            signer: None,
        }
    }
}
