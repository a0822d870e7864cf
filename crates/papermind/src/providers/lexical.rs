//! Deterministic lexical embedder
//!
//! Feature-hashes word tokens into a fixed-dimension term-frequency vector and
//! L2-normalizes it. Seedless and stable across processes, so identical inputs
//! always produce identical rankings.

use async_trait::async_trait;

use crate::engine::query::tokenize;
use crate::error::Result;

use super::RelevanceBackend;

/// Default embedding dimensions
const DEFAULT_DIMENSIONS: usize = 512;

/// Feature-hashed bag-of-words embedder
#[derive(Debug, Clone)]
pub struct LexicalEmbedder {
    dimensions: usize,
}

impl LexicalEmbedder {
    /// Create an embedder with the given dimensions
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }
}

impl Default for LexicalEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSIONS)
    }
}

/// FNV-1a, the stable hash behind feature bucketing
fn fnv1a(token: &str) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = OFFSET_BASIS;
    for byte in token.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

#[async_trait]
impl RelevanceBackend for LexicalEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in tokenize(text) {
            let index = (fnv1a(&token) % self.dimensions as u64) as usize;
            vector[index] += 1.0;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }

        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "lexical"
    }
}
