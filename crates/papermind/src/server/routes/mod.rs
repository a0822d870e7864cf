//! API routes for the analysis server

pub mod analyze;
pub mod parse;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        // Batch collection analysis
        .route("/analyze", post(analyze::analyze_collection))
        // Single-document upload - with larger body limit
        .route(
            "/parse",
            post(parse::parse_upload).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        // Info
        .route("/info", get(info))
}

/// API info endpoint
async fn info() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "name": "papermind",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Persona-driven document section ranking and refinement",
        "endpoints": {
            "POST /api/analyze": "Analyze a collection of PDFs on disk (writes output file)",
            "POST /api/parse": "Upload one PDF and analyze it (no persistence)",
            "GET /api/info": "This document"
        }
    }))
}
