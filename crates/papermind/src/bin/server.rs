//! Analysis server binary
//!
//! Run with: cargo run -p papermind --bin papermind-server

use std::path::PathBuf;

use papermind::{config::AppConfig, server::AnalysisServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "papermind=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!(
        r#"
╔═══════════════════════════════════════════════════════════╗
║                        Papermind                          ║
║        Persona-Driven Document Section Analysis           ║
╚═══════════════════════════════════════════════════════════╝
"#
    );

    // Load configuration (PAPERMIND_CONFIG points at a JSON file, else defaults)
    let config = match std::env::var_os("PAPERMIND_CONFIG") {
        Some(path) => AppConfig::from_file(&PathBuf::from(path))?,
        None => AppConfig::default(),
    };

    tracing::info!("Configuration loaded");
    tracing::info!("  - Collections dir: {}", config.extraction.collections_dir.display());
    tracing::info!("  - Ranking top_k: {}", config.pipeline.ranking_top_k);
    tracing::info!("  - Refinement top_k: {}", config.pipeline.refine_top_k);
    tracing::info!(
        "  - Invocation timeout: {}s",
        config.pipeline.invocation_timeout_secs
    );

    if !config.extraction.collections_dir.is_dir() {
        tracing::warn!(
            "collections directory '{}' does not exist; only /api/parse will work",
            config.extraction.collections_dir.display()
        );
    }

    let server = AnalysisServer::new(config);

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  POST /api/analyze - Analyze a collection on disk");
    println!("  POST /api/parse   - Upload and analyze one PDF");
    println!("  GET  /api/info    - API info");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
