use axum::{
    extract::{rejection::JsonRejection, State},
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        Method, Uri,
    },
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use wallet_verifier_service::common::api::{self, SharedVerifier, HEALTH_PATH, VERIFY_PATH};
use wallet_verifier_service::common::config::ServerConfig;
use wallet_verifier_service::common::error::ApiError;
use wallet_verifier_service::common::types::{
    HealthResponse, VerificationRequest, VerificationResult,
};

pub fn create_router(verifier: SharedVerifier) -> Router {
    Router::new()
        .route(HEALTH_PATH, get(handle_health).fallback(handle_wrong_method))
        .route(
            VERIFY_PATH,
            post(handle_verify_request).fallback(handle_wrong_method),
        )
        .fallback(handle_not_found)
        .with_state(verifier)
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    if config.allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(config.allowed_origins.clone()))
        .allow_headers([ACCEPT, CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST])
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

async fn handle_wrong_method(method: Method, uri: Uri) -> ApiError {
    ApiError::MethodNotAllowed {
        method: method.to_string(),
        path: uri.path().to_string(),
    }
}

async fn handle_not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(uri.path().to_string())
}

async fn handle_verify_request(
    State(verifier): State<SharedVerifier>,
    payload: Result<Json<VerificationRequest>, JsonRejection>,
) -> Result<Json<VerificationResult>, ApiError> {
    let Json(request) = payload?;
    let result = api::handle_verification(verifier.as_ref(), request)?;
    Ok(Json(result))
}


#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env()?;

    let app = create_router(api::default_verifier()).layer(cors_layer(&config));

    let addr = config.socket_addr();
    tracing::info!(%addr, "verifier service listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
