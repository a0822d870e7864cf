//! Relevance backend providers

pub mod lexical;

pub use lexical::LexicalEmbedder;

use async_trait::async_trait;

use crate::error::Result;

/// Trait for turning text into a relevance embedding
///
/// The backend is a long-lived, read-only handle shared across invocations
/// (`Arc<dyn RelevanceBackend>`), injected into the scorer and refiner so
/// tests can substitute a fake.
///
/// Implementations:
/// - `LexicalEmbedder`: deterministic feature-hashed bag of words (default)
#[async_trait]
pub trait RelevanceBackend: Send + Sync {
    /// Embed a single text into a fixed-dimension vector
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embedding dimensions
    fn dimensions(&self) -> usize;

    /// Provider name for logging
    fn name(&self) -> &str;
}
