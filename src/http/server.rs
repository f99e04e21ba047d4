//! HTTP server implementation.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tracing::{error, info};

use super::{handlers, middleware};
use crate::config::AppConfig;
use crate::error::{CareerscopeError, Result};
use crate::ratelimit::RateLimiter;
use crate::stats::StatsService;

/// Shared state handed to every handler and middleware.
#[derive(Clone)]
pub struct AppState {
    /// Statistics query service
    pub stats: StatsService,
    /// The rate limiter instance
    pub limiter: Arc<RateLimiter>,
    /// Loaded service configuration
    pub config: Arc<AppConfig>,
}

/// Build the API router with all middleware applied.
///
/// Requests pass CORS first, then the rate limiter, then the API key
/// check, so a rate limited caller cannot probe key validity.
pub fn router(state: AppState) -> Router {
    let cors = middleware::cors_layer(&state.config.security);

    Router::new()
        .route("/api/calculate", get(handlers::calculate))
        .route("/api/occupations", get(handlers::occupations))
        .route("/api/locations", get(handlers::locations))
        .route("/api/states", get(handlers::states))
        .route("/api/areas-by-state", get(handlers::areas_by_state))
        .route("/api/health", get(handlers::health))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_api_key,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit,
        ))
        .layer(cors)
        .with_state(state)
}

/// HTTP server for the statistics API.
pub struct HttpServer {
    /// Address to bind to
    addr: SocketAddr,
    /// Shared application state
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server.
    pub fn new(addr: SocketAddr, state: AppState) -> Self {
        Self { addr, state }
    }

    /// Start the HTTP server.
    ///
    /// This method will block until the server is shut down.
    pub async fn serve(self) -> Result<()> {
        let app = router(self.state).into_make_service_with_connect_info::<SocketAddr>();

        info!(addr = %self.addr, "Starting HTTP server");

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        axum::serve(listener, app).await.map_err(|e| {
            error!(error = %e, "HTTP server failed");
            CareerscopeError::Io(e)
        })
    }

    /// Start the HTTP server with graceful shutdown.
    ///
    /// The server will shut down when the provided signal resolves.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let app = router(self.state).into_make_service_with_connect_info::<SocketAddr>();

        info!(addr = %self.addr, "Starting HTTP server with graceful shutdown");

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(signal)
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP server failed");
                CareerscopeError::Io(e)
            })
    }
}
