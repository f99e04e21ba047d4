//! Request middleware: rate limiting, API keys, and CORS.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, warn};

use super::AppState;
use crate::config::SecurityConfig;
use crate::ratelimit::client_identity;

/// Enforce the per-identity rate limit ahead of every route.
///
/// Rejected requests get a JSON 429 with a `Retry-After` header carrying
/// the seconds until the caller's window resets, rounded up.
pub async fn rate_limit(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    let identity = client_identity(
        request.headers(),
        &state.config.rate_limiting.trusted_headers,
        peer,
    );

    let decision = state.limiter.check(&identity);
    if decision.allowed {
        return next.run(request).await;
    }

    debug!(identity = %identity, "Rejecting rate limited request");

    let mut retry_secs = decision.retry_after.as_secs();
    if decision.retry_after.subsec_nanos() > 0 {
        retry_secs += 1;
    }

    (
        StatusCode::TOO_MANY_REQUESTS,
        [(header::RETRY_AFTER, retry_secs.to_string())],
        Json(json!({ "error": "rate limit exceeded" })),
    )
        .into_response()
}

/// Require a configured API key on every route except the health check.
///
/// With no keys configured the check is disabled entirely.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let keys = &state.config.security.api_keys;
    if keys.is_empty() || request.uri().path() == "/api/health" {
        return next.run(request).await;
    }

    let provided = request
        .headers()
        .get("x-api-key")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    if provided.is_empty() {
        warn!("Received request without an API key");
        return unauthorized("missing API key");
    }
    if !keys.iter().any(|key| key == provided) {
        warn!("Received request with an invalid API key");
        return unauthorized("invalid API key");
    }

    next.run(request).await
}

fn unauthorized(message: &'static str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": message })),
    )
        .into_response()
}

/// Build the CORS policy from the configured allowed origins.
pub fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = security
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
}
