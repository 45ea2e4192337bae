//! Request handling shared by every HTTP surface of the verifier.

use std::sync::Arc;

use crate::common::error::ApiError;
use crate::common::types::{VerificationRequest, VerificationResult};
use crate::common::verify::{MessageVerifier, PersonalSignVerifier};

pub const HEALTH_PATH: &str = "/health";
pub const VERIFY_PATH: &str = "/verify-signature";

pub type SharedVerifier = Arc<dyn MessageVerifier>;

pub fn default_verifier() -> SharedVerifier {
    Arc::new(PersonalSignVerifier)
}

pub const JSON_CONTENT_TYPE_REQUIRED: &str =
    "Expected request with `Content-Type: application/json`";

/// Accepts `application/json` and `application/*+json`, ignoring parameters.
pub fn check_json_content_type(content_type: Option<&str>) -> Result<(), ApiError> {
    let is_json = content_type
        .and_then(|value| value.split(';').next())
        .map(|mime| mime.trim().to_ascii_lowercase())
        .is_some_and(|mime| {
            mime == "application/json"
                || (mime.starts_with("application/") && mime.ends_with("+json"))
        });

    if is_json {
        Ok(())
    } else {
        Err(ApiError::MalformedBody(JSON_CONTENT_TYPE_REQUIRED.to_string()))
    }
}

/// Parses a raw request body.
pub fn parse_request(body: &[u8]) -> Result<VerificationRequest, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::from_json_error(&e))
}

/// Checks that both fields are present and runs the verifier.
///
/// The verifier is not consulted when a field is missing.
pub fn handle_verification(
    verifier: &dyn MessageVerifier,
    request: VerificationRequest,
) -> Result<VerificationResult, ApiError> {
    let (message, signature) = request.into_parts()?;
    let result = verifier.verify(&message, &signature);
    tracing::info!(
        is_valid = result.is_valid,
        signer = %result.signer,
        message_len = message.len(),
        "signature verified"
    );
    Ok(result)
}
