use reqwest::StatusCode;
use thiserror::Error;

use crate::common::api::{HEALTH_PATH, VERIFY_PATH};
use crate::common::types::{
    ErrorResponse, HealthResponse, VerificationRequest, VerificationResult,
};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("could not reach the verification service: {0}")]
    Http(#[from] reqwest::Error),
    #[error("verification service returned {status}: {message}")]
    Rejected { status: StatusCode, message: String },
}

/// HTTP client for the verifier service.
#[derive(Clone, Debug)]
pub struct VerifierClient {
    base_url: String,
    http: reqwest::Client,
}

impl VerifierClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, HEALTH_PATH))
            .send()
            .await?;
        Self::read_json(response).await
    }

    /// Asks the service who signed `message`.
    pub async fn verify_signature(
        &self,
        message: &str,
        signature: &str,
    ) -> Result<VerificationResult, ClientError> {
        tracing::debug!(url = %self.base_url, "sending verification request");
        let response = self
            .http
            .post(format!("{}{}", self.base_url, VERIFY_PATH))
            .json(&VerificationRequest::new(message, signature))
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let text = response.text().await?;
        let message = serde_json::from_str::<ErrorResponse>(&text)
            .map(|body| body.message)
            .unwrap_or(text);
        Err(ClientError::Rejected { status, message })
    }
}
