//! Relevance scoring of sections against the persona query

use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::providers::RelevanceBackend;
use crate::types::{ScoredSection, Section};

use super::query::{cosine, tokenize, PersonaQuery};

/// Scores sections by embedding similarity to the persona query
///
/// Purely functional given its backend: identical inputs always produce
/// identical scores, so the downstream ranking is reproducible.
pub struct SectionScorer {
    backend: Arc<dyn RelevanceBackend>,
    heading_weight: f32,
    parallel_sections: usize,
}

impl SectionScorer {
    /// Create a scorer around a shared backend handle
    pub fn new(backend: Arc<dyn RelevanceBackend>, config: &PipelineConfig) -> Self {
        Self {
            backend,
            heading_weight: config.heading_weight,
            parallel_sections: config.section_workers(),
        }
    }

    /// Score every section against the query
    ///
    /// Returns one `ScoredSection` per input, in input order. Sections are
    /// embedded concurrently up to the worker limit; the indexed merge keeps
    /// the output independent of scheduling order.
    pub async fn score(
        &self,
        sections: &[Section],
        query: &PersonaQuery,
    ) -> Result<Vec<ScoredSection>> {
        if sections.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(usize, ScoredSection)> =
            stream::iter(sections.iter().cloned().enumerate())
                .map(|(index, section)| self.score_indexed(index, section, query))
                .buffer_unordered(self.parallel_sections)
                .collect()
                .await;

        scored.sort_by_key(|(index, _)| *index);
        Ok(scored.into_iter().map(|(_, s)| s).collect())
    }

    /// Score one section, tagging it with its input index for the ordered merge.
    ///
    /// Extracted from the `buffer_unordered` closure so the per-section future
    /// has a concrete, `Send` type rather than a higher-ranked one (which
    /// rustc cannot prove `Send` through an async HTTP handler).
    async fn score_indexed(
        &self,
        index: usize,
        section: Section,
        query: &PersonaQuery,
    ) -> (usize, ScoredSection) {
        let score = self.score_one(&section, query).await;
        (index, ScoredSection { section, score })
    }

    /// Score a single section; never fails
    ///
    /// Empty body text gets the floor score. A backend failure is scoped to
    /// this section and substituted with the deterministic token-overlap
    /// fallback rather than silently dropping the section.
    async fn score_one(&self, section: &Section, query: &PersonaQuery) -> f64 {
        if section.text.trim().is_empty() {
            return 0.0;
        }

        let Some(query_vector) = query.vector() else {
            return generic_score(section);
        };

        match self.embed_section(section).await {
            Ok(vector) => f64::from(cosine(query_vector, &vector).max(0.0)),
            Err(e) => {
                tracing::warn!(
                    "relevance backend '{}' failed on page {} of '{}': {}; using token-overlap fallback",
                    self.backend.name(),
                    section.page_number,
                    section.document,
                    e
                );
                query.overlap_score(&full_text(section))
            }
        }
    }

    /// Embed heading and body, weighting the heading higher
    async fn embed_section(&self, section: &Section) -> Result<Vec<f32>> {
        let mut vector = self.backend.embed(&section.text).await?;

        if let Some(heading) = section.heading.as_deref().filter(|h| !h.trim().is_empty()) {
            let heading_vector = self.backend.embed(heading).await?;
            for (v, h) in vector.iter_mut().zip(heading_vector.iter()) {
                *v += self.heading_weight * h;
            }
        }

        Ok(vector)
    }
}

/// Generic relevance for a non-personalized query: content density
pub(crate) fn generic_text_score(text: &str) -> f64 {
    let count = tokenize(text).len() as f64;
    count / (count + 50.0)
}

fn generic_score(section: &Section) -> f64 {
    generic_text_score(&full_text(section))
}

fn full_text(section: &Section) -> String {
    match section.heading.as_deref() {
        Some(heading) if !heading.trim().is_empty() => {
            format!("{}\n{}", heading, section.text)
        }
        _ => section.text.clone(),
    }
}
