//! Application state for the analysis server

use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::AppConfig;
use crate::pipeline::Pipeline;
use crate::providers::{LexicalEmbedder, RelevanceBackend};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: AppConfig,
    /// The analysis pipeline (holds the shared backend handle)
    pipeline: Pipeline,
    /// Ready state
    ready: RwLock<bool>,
}

impl AppState {
    /// Create state with the default lexical backend
    pub fn new(config: AppConfig) -> Self {
        let backend: Arc<dyn RelevanceBackend> = Arc::new(LexicalEmbedder::default());
        Self::with_backend(config, backend)
    }

    /// Create state around an injected relevance backend
    pub fn with_backend(config: AppConfig, backend: Arc<dyn RelevanceBackend>) -> Self {
        tracing::info!(
            "initializing analysis state (backend: {}, ranking_top_k: {}, refine_top_k: {})",
            backend.name(),
            config.pipeline.ranking_top_k,
            config.pipeline.refine_top_k
        );

        let pipeline = Pipeline::new(backend, &config);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pipeline,
                ready: RwLock::new(true),
            }),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get the analysis pipeline
    pub fn pipeline(&self) -> &Pipeline {
        &self.inner.pipeline
    }

    /// Check if the server is ready
    pub fn is_ready(&self) -> bool {
        *self.inner.ready.read()
    }

    /// Set ready state
    pub fn set_ready(&self, ready: bool) {
        *self.inner.ready.write() = ready;
    }
}
