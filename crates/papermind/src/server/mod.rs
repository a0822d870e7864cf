//! HTTP server for the analysis service

pub mod routes;
pub mod state;

use std::net::SocketAddr;

use axum::{routing::get, Json, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::error::Result;
use state::AppState;

/// Analysis HTTP server
pub struct AnalysisServer {
    config: AppConfig,
    state: AppState,
}

impl AnalysisServer {
    /// Create a new server
    pub fn new(config: AppConfig) -> Self {
        let state = AppState::new(config.clone());
        Self { config, state }
    }

    /// Create with an already-built state (used to inject a backend)
    pub fn with_state(config: AppConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Build the router with all routes
    fn build_router(&self) -> Router {
        let mut router = Router::new()
            // Health checks
            .route("/", get(status))
            .route("/health", get(health_check))
            .route("/ready", get(readiness))
            // API routes with body limit for multipart uploads
            .nest(
                "/api",
                routes::api_routes(self.config.server.max_upload_size),
            )
            .with_state(self.state.clone())
            // Middleware layers (order matters - applied bottom to top)
            .layer(TraceLayer::new_for_http())
            .layer(CompressionLayer::new());

        if self.config.server.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            router = router.layer(cors);
        }

        router
    }

    /// Start the server
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.server.host, self.config.server.port)
            .parse()
            .map_err(|e| crate::error::Error::Config(format!("Invalid address: {}", e)))?;

        let router = self.build_router();

        tracing::info!("starting analysis server on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| crate::error::Error::Config(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| crate::error::Error::Internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.server.host, self.config.server.port)
    }
}

/// Root status endpoint
async fn status() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "papermind API running" }))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Readiness check endpoint
async fn readiness(state: axum::extract::State<AppState>) -> axum::http::StatusCode {
    if state.is_ready() {
        axum::http::StatusCode::OK
    } else {
        axum::http::StatusCode::SERVICE_UNAVAILABLE
    }
}
