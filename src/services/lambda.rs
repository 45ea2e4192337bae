use lambda_http::http::{header::CONTENT_TYPE, Method};
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use serde::Serialize;
use wallet_verifier_service::common::api::{self, SharedVerifier, HEALTH_PATH, VERIFY_PATH};
use wallet_verifier_service::common::error::ApiError;
use wallet_verifier_service::common::types::HealthResponse;

/// Main function for the Lambda handler
#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .with_line_number(false)
        .init();

    let verifier = api::default_verifier();
    run(service_fn(|event| handle_request(event, verifier.clone()))).await
}

fn json_response<T: Serialize>(status: u16, body: &T) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_string(body)?))?)
}

fn error_response(err: ApiError) -> Result<Response<Body>, Error> {
    tracing::warn!(error = %err, "rejected request");
    json_response(err.status().as_u16(), &err.to_response_body())
}

/// Routes the same way the axum service does: a known path with the wrong
/// method is a 405, an unknown path a 404.
async fn handle_request(event: Request, verifier: SharedVerifier) -> Result<Response<Body>, Error> {
    let method = event.method().clone();
    let path = event.uri().path().to_string();
    tracing::info!(%method, %path, "received request");

    let allowed = match path.as_str() {
        HEALTH_PATH => Method::GET,
        VERIFY_PATH => Method::POST,
        _ => return error_response(ApiError::NotFound(path)),
    };
    if method != allowed && !(allowed == Method::GET && method == Method::HEAD) {
        return error_response(ApiError::MethodNotAllowed {
            method: method.to_string(),
            path,
        });
    }

    if path == HEALTH_PATH {
        json_response(200, &HealthResponse::ok())
    } else {
        handle_verify_request(event, verifier).await
    }
}

async fn handle_verify_request(event: Request, verifier: SharedVerifier) -> Result<Response<Body>, Error> {
    let content_type = event
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());

    let outcome = api::check_json_content_type(content_type)
        .and_then(|()| api::parse_request(event.body()))
        .and_then(|request| api::handle_verification(verifier.as_ref(), request));

    match outcome {
        Ok(result) => json_response(200, &result),
        Err(err) => error_response(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambda_http::http::Request;
    use serde_json::{json, Value};
    use wallet_verifier_service::test_utils;

    fn setup_test_request(method: &str, path: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn read_body(response: Response<Body>) -> Value {
        let body_bytes = match response.into_body() {
            Body::Text(text) => text.into_bytes(),
            Body::Binary(bytes) => bytes,
            _ => Vec::new(),
        };
        serde_json::from_slice(&body_bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let request = setup_test_request("GET", HEALTH_PATH, "");
        let response = handle_request(request, api::default_verifier()).await.unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(read_body(response), json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_handle_verify_request_valid() {
        let request = test_utils::create_signed_request("Hello, World!");
        let body = serde_json::to_string(&request).unwrap();

        let response = handle_request(
            setup_test_request("POST", VERIFY_PATH, &body),
            api::default_verifier(),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), 200);
        let response = read_body(response);
        assert_eq!(response["isValid"], true);
        assert_eq!(response["signer"], test_utils::TEST_ADDRESS);
        assert_eq!(response["originalMessage"], "Hello, World!");
    }

    #[tokio::test]
    async fn test_handle_verify_request_invalid_signature() {
        let body = json!({ "message": "Hello, World!", "signature": "0xmalformed" }).to_string();
        let response = handle_request(
            setup_test_request("POST", VERIFY_PATH, &body),
            api::default_verifier(),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(
            read_body(response),
            json!({ "isValid": false, "signer": "", "originalMessage": "Hello, World!" })
        );
    }

    #[tokio::test]
    async fn test_handle_verify_request_non_canonical_signatures() {
        let good = test_utils::sign_with_test_key("Hello, World!");
        for signature in [
            test_utils::malleate_signature(&good),
            test_utils::with_recovery_byte(&good, 29),
        ] {
            let body = json!({ "message": "Hello, World!", "signature": signature }).to_string();
            let response = handle_request(
                setup_test_request("POST", VERIFY_PATH, &body),
                api::default_verifier(),
            )
            .await
            .unwrap();

            assert_eq!(response.status(), 200);
            let response = read_body(response);
            assert_eq!(response["isValid"], false);
            assert_eq!(response["signer"], "");
        }
    }

    #[tokio::test]
    async fn test_handle_verify_request_missing_signature() {
        let body = json!({ "message": "Hello, World!" }).to_string();
        let response = handle_request(
            setup_test_request("POST", VERIFY_PATH, &body),
            api::default_verifier(),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), 400);
        let response = read_body(response);
        assert_eq!(response["error"], "Bad Request");
        assert_eq!(response["message"], "Both message and signature are required");
    }

    #[tokio::test]
    async fn test_handle_verify_request_malformed_body() {
        let response = handle_request(
            setup_test_request("POST", VERIFY_PATH, "{not json"),
            api::default_verifier(),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), 500);
        assert_eq!(read_body(response)["error"], "Server Error");
    }

    #[tokio::test]
    async fn test_handle_verify_request_without_content_type() {
        let request = test_utils::create_signed_request("Hello, World!");
        let request = Request::builder()
            .method("POST")
            .uri(VERIFY_PATH)
            .body(Body::from(serde_json::to_string(&request).unwrap()))
            .unwrap();

        let response = handle_request(request, api::default_verifier()).await.unwrap();

        assert_eq!(response.status(), 500);
        assert_eq!(
            read_body(response),
            json!({
                "error": "Server Error",
                "message": "Expected request with `Content-Type: application/json`",
            })
        );
    }

    #[tokio::test]
    async fn test_handle_request_wrong_method() {
        let request = setup_test_request("GET", VERIFY_PATH, "");
        let response = handle_request(request, api::default_verifier()).await.unwrap();

        assert_eq!(response.status(), 405);
        assert_eq!(read_body(response)["error"], "Method Not Allowed");

        let request = setup_test_request("POST", HEALTH_PATH, "");
        let response = handle_request(request, api::default_verifier()).await.unwrap();
        assert_eq!(response.status(), 405);
    }

    #[tokio::test]
    async fn test_handle_request_invalid_path() {
        let request = setup_test_request("POST", "/invalid", "");
        let response = handle_request(request, api::default_verifier()).await.unwrap();

        assert_eq!(response.status(), 404);
        assert_eq!(
            read_body(response),
            json!({ "error": "Not Found", "message": "No route for /invalid" })
        );
    }
}
