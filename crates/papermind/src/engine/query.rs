//! Persona query derivation shared by scoring and refinement
//!
//! The scorer and the refiner must agree on what "relevant" means, so both
//! consume one [`PersonaQuery`] built once per invocation.

use std::collections::HashMap;
use std::sync::Arc;

use unicode_segmentation::UnicodeSegmentation;

use crate::error::Result;
use crate::providers::RelevanceBackend;
use crate::types::Persona;

/// Tokens shorter than this carry no relevance signal
const MIN_TOKEN_CHARS: usize = 2;

/// Common English words excluded from the relevance vocabulary
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "been", "but", "by", "for", "from", "had", "has",
    "have", "he", "her", "his", "if", "in", "into", "is", "it", "its", "not", "of", "on", "or",
    "she", "such", "that", "the", "their", "then", "there", "these", "they", "this", "to", "was",
    "were", "which", "will", "with", "you", "your",
];

/// Tokenize text into lowercase word tokens
pub fn tokenize(text: &str) -> Vec<String> {
    text.unicode_words()
        .map(|w| w.to_lowercase())
        .filter(|w| w.chars().count() >= MIN_TOKEN_CHARS && !STOPWORDS.contains(&w.as_str()))
        .collect()
}

/// Cosine similarity between two vectors; 0.0 when either has no magnitude
pub(crate) fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Query representation derived once per invocation from persona role + task
#[derive(Debug, Clone)]
pub struct PersonaQuery {
    /// Combined query text
    text: String,
    /// Query token counts, for the lexical-overlap fallback
    tokens: HashMap<String, u32>,
    /// Query embedding; `None` when the query is empty (generic relevance mode)
    vector: Option<Vec<f32>>,
}

impl PersonaQuery {
    /// Build the query from the persona, embedding it via the backend
    ///
    /// A persona with no usable tokens yields a non-personalized query; the
    /// scorer then falls back to a generic relevance signal instead of failing.
    pub async fn build(backend: &Arc<dyn RelevanceBackend>, persona: &Persona) -> Result<Self> {
        let text = format!("{} {}", persona.role.trim(), persona.task.trim())
            .trim()
            .to_string();

        let mut tokens: HashMap<String, u32> = HashMap::new();
        for token in tokenize(&text) {
            *tokens.entry(token).or_insert(0) += 1;
        }

        let vector = if tokens.is_empty() {
            None
        } else {
            Some(backend.embed(&text).await?)
        };

        Ok(Self {
            text,
            tokens,
            vector,
        })
    }

    /// Whether the query carries a persona signal
    pub fn is_personalized(&self) -> bool {
        self.vector.is_some()
    }

    /// Combined query text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Query embedding, if personalized
    pub fn vector(&self) -> Option<&[f32]> {
        self.vector.as_deref()
    }

    /// Fraction of `text` tokens that appear in the query
    ///
    /// Deterministic fallback used when the backend fails on one section.
    pub fn overlap_score(&self, text: &str) -> f64 {
        if self.tokens.is_empty() {
            return 0.0;
        }
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return 0.0;
        }
        let matches = tokens
            .iter()
            .filter(|t| self.tokens.contains_key(*t))
            .count();
        matches as f64 / tokens.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::LexicalEmbedder;

    fn backend() -> Arc<dyn RelevanceBackend> {
        Arc::new(LexicalEmbedder::default())
    }

    #[test]
    fn tokenize_lowercases_and_drops_stopwords() {
        let tokens = tokenize("The Quick Brown fox and a dog");
        assert_eq!(tokens, vec!["quick", "brown", "fox", "dog"]);
    }

    #[tokio::test]
    async fn empty_persona_is_not_personalized() {
        let persona = Persona::new("", "");
        let query = PersonaQuery::build(&backend(), &persona).await.unwrap();
        assert!(!query.is_personalized());
        assert!(query.vector().is_none());
    }

    #[tokio::test]
    async fn stopword_only_persona_is_not_personalized() {
        let persona = Persona::new("the", "of and");
        let query = PersonaQuery::build(&backend(), &persona).await.unwrap();
        assert!(!query.is_personalized());
    }

    #[tokio::test]
    async fn overlap_score_counts_matching_tokens() {
        let persona = Persona::new("travel planner", "plan a trip to France");
        let query = PersonaQuery::build(&backend(), &persona).await.unwrap();
        assert!(query.is_personalized());
        assert_eq!(query.overlap_score("trip planner"), 1.0);
        assert_eq!(query.overlap_score("unrelated words entirely"), 0.0);
        assert_eq!(query.overlap_score(""), 0.0);
    }

    #[test]
    fn cosine_handles_zero_vectors() {
        assert_eq!(cosine(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        let same = cosine(&[1.0, 2.0], &[1.0, 2.0]);
        assert!((same - 1.0).abs() < 1e-6);
    }
}
