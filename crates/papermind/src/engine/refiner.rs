//! Subsection refinement: condensed, persona-relevant excerpts
//!
//! Each ranked section is split into candidate passages; each passage is
//! condensed extractively by keeping its most query-relevant sentences in
//! their original order. The emitted chunk set is bounded globally, not
//! per-section.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use unicode_segmentation::UnicodeSegmentation;

use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::providers::RelevanceBackend;
use crate::types::{RankedSection, RefinedChunk};

use super::query::{cosine, PersonaQuery};
use super::scorer::generic_text_score;

/// Sections shorter than this are passed through verbatim
const MIN_CONDENSE_CHARS: usize = 240;
/// Maximum characters per candidate passage
const MAX_PASSAGE_CHARS: usize = 800;
/// Number of top sentences kept per condensed passage
const SENTENCES_PER_CHUNK: usize = 3;

/// Candidate chunk before the global budget is applied
struct CandidateChunk {
    chunk: RefinedChunk,
    importance_rank: u32,
    order: usize,
}

/// Condenses ranked sections into persona-relevant chunks
pub struct SectionRefiner {
    backend: Arc<dyn RelevanceBackend>,
    parallel_sections: usize,
}

impl SectionRefiner {
    /// Create a refiner around a shared backend handle
    pub fn new(backend: Arc<dyn RelevanceBackend>, config: &PipelineConfig) -> Self {
        Self {
            backend,
            parallel_sections: config.section_workers(),
        }
    }

    /// Refine ranked sections into at most `top_k` chunks overall
    ///
    /// Accepts any `RankedSection` collection, not only the ranker's output.
    /// When more candidates exist than `top_k`, the highest-scored chunks win
    /// globally; ties go to the lower `importance_rank`, then to the earlier
    /// candidate. Chunks are emitted in selection order (score descending).
    pub async fn refine(
        &self,
        ranked: &[RankedSection],
        query: &PersonaQuery,
        top_k: usize,
    ) -> Result<Vec<RefinedChunk>> {
        if top_k == 0 {
            return Err(Error::Config("refinement top_k must be positive".to_string()));
        }
        if ranked.is_empty() {
            return Ok(Vec::new());
        }

        let mut per_section: Vec<(usize, Vec<CandidateChunk>)> =
            stream::iter(ranked.iter().cloned().enumerate())
                .map(|(index, section)| self.candidates_indexed(index, section, query))
                .buffer_unordered(self.parallel_sections)
                .collect()
                .await;
        per_section.sort_by_key(|(index, _)| *index);

        let mut candidates: Vec<CandidateChunk> = Vec::new();
        for (_, chunks) in per_section {
            for mut candidate in chunks {
                candidate.order = candidates.len();
                candidates.push(candidate);
            }
        }

        candidates.sort_by(|a, b| {
            b.chunk
                .score
                .total_cmp(&a.chunk.score)
                .then(a.importance_rank.cmp(&b.importance_rank))
                .then(a.order.cmp(&b.order))
        });
        candidates.truncate(top_k);

        Ok(candidates.into_iter().map(|c| c.chunk).collect())
    }

    /// Candidate chunks for one section, tagged with its input index.
    ///
    /// Extracted from the `buffer_unordered` closure so the per-section future
    /// has a concrete, `Send` type rather than a higher-ranked one (which
    /// rustc cannot prove `Send` through an async HTTP handler).
    async fn candidates_indexed(
        &self,
        index: usize,
        ranked: RankedSection,
        query: &PersonaQuery,
    ) -> (usize, Vec<CandidateChunk>) {
        (index, self.candidates_for(&ranked, query).await)
    }

    /// Candidate chunks for one section; never fails
    ///
    /// A section too short to condense, or one the backend fails on, still
    /// yields a verbatim chunk carrying the section's own score; refinement
    /// never drops a ranked section entirely.
    async fn candidates_for(
        &self,
        ranked: &RankedSection,
        query: &PersonaQuery,
    ) -> Vec<CandidateChunk> {
        let section = &ranked.section;
        let text = section.text.trim();

        if text.chars().count() < MIN_CONDENSE_CHARS {
            return vec![verbatim(ranked, text)];
        }

        let mut candidates = Vec::new();
        for passage in split_passages(text) {
            match self.condense_passage(&passage, query).await {
                Ok((refined_text, score)) => candidates.push(CandidateChunk {
                    chunk: RefinedChunk {
                        document: section.document.clone(),
                        page_number: section.page_number,
                        refined_text,
                        score,
                    },
                    importance_rank: ranked.importance_rank,
                    order: 0,
                }),
                Err(e) => {
                    tracing::warn!(
                        "refinement backend '{}' failed on page {} of '{}': {}; keeping passage verbatim",
                        self.backend.name(),
                        section.page_number,
                        section.document,
                        e
                    );
                    candidates.push(verbatim(ranked, &passage));
                }
            }
        }

        if candidates.is_empty() {
            candidates.push(verbatim(ranked, text));
        }
        candidates
    }

    /// Condense one passage to its most relevant sentences, in original order
    async fn condense_passage(
        &self,
        passage: &str,
        query: &PersonaQuery,
    ) -> Result<(String, f64)> {
        let sentences: Vec<String> = passage
            .split_sentence_bounds()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if sentences.len() <= SENTENCES_PER_CHUNK {
            let score = self.relevance(passage, query).await?;
            return Ok((passage.to_string(), score));
        }

        let mut scored: Vec<(usize, f64)> = Vec::with_capacity(sentences.len());
        for (index, sentence) in sentences.iter().enumerate() {
            scored.push((index, self.relevance(sentence, query).await?));
        }
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        let mut selected: Vec<(usize, f64)> =
            scored.into_iter().take(SENTENCES_PER_CHUNK).collect();
        let score = selected.iter().map(|(_, s)| *s).sum::<f64>() / selected.len() as f64;
        selected.sort_by_key(|(index, _)| *index);

        let refined = selected
            .iter()
            .map(|(index, _)| sentences[*index].as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Ok((refined, score))
    }

    /// Relevance of a text span, in the same direction as section scoring
    async fn relevance(&self, text: &str, query: &PersonaQuery) -> Result<f64> {
        match query.vector() {
            Some(query_vector) => {
                let vector = self.backend.embed(text).await?;
                Ok(f64::from(cosine(query_vector, &vector).max(0.0)))
            }
            None => Ok(generic_text_score(text)),
        }
    }
}

fn verbatim(ranked: &RankedSection, text: &str) -> CandidateChunk {
    CandidateChunk {
        chunk: RefinedChunk {
            document: ranked.section.document.clone(),
            page_number: ranked.section.page_number,
            refined_text: text.to_string(),
            score: ranked.score,
        },
        importance_rank: ranked.importance_rank,
        order: 0,
    }
}

/// Split section text into candidate passages
///
/// Paragraphs stay whole; oversized paragraphs are windowed on sentence
/// boundaries.
fn split_passages(text: &str) -> Vec<String> {
    let mut passages = Vec::new();

    for paragraph in text.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
        if paragraph.chars().count() <= MAX_PASSAGE_CHARS {
            passages.push(paragraph.to_string());
            continue;
        }

        let mut current = String::new();
        for sentence in paragraph.split_sentence_bounds() {
            if !current.is_empty()
                && current.chars().count() + sentence.chars().count() > MAX_PASSAGE_CHARS
            {
                passages.push(current.trim().to_string());
                current = String::new();
            }
            current.push_str(sentence);
        }
        if !current.trim().is_empty() {
            passages.push(current.trim().to_string());
        }
    }

    if passages.is_empty() {
        passages.push(text.trim().to_string());
    }
    passages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::LexicalEmbedder;
    use crate::types::{Persona, Section};
    use async_trait::async_trait;

    struct FailingBackend;

    #[async_trait]
    impl RelevanceBackend for FailingBackend {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(Error::backend("backend offline"))
        }

        fn dimensions(&self) -> usize {
            0
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn ranked(document: &str, text: &str, page: u32, score: f64, rank: u32) -> RankedSection {
        RankedSection {
            section: Section {
                document: document.to_string(),
                heading: None,
                text: text.to_string(),
                page_number: page,
            },
            score,
            importance_rank: rank,
        }
    }

    fn refiner() -> SectionRefiner {
        SectionRefiner::new(
            Arc::new(LexicalEmbedder::default()),
            &PipelineConfig::default(),
        )
    }

    async fn query(role: &str, task: &str) -> PersonaQuery {
        let backend: Arc<dyn RelevanceBackend> = Arc::new(LexicalEmbedder::default());
        PersonaQuery::build(&backend, &Persona::new(role, task))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn zero_top_k_fails_fast() {
        let q = query("chef", "plan a menu").await;
        let result = refiner().refine(&[], &q, 0).await;
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn empty_input_yields_empty_output() {
        let q = query("chef", "plan a menu").await;
        let chunks = refiner().refine(&[], &q, 3).await.unwrap();
        assert!(chunks.is_empty());
    }

    #[tokio::test]
    async fn short_section_passes_through_verbatim() {
        let q = query("chef", "plan a menu").await;
        let sections = vec![ranked("menu.pdf", "Soup of the day.", 4, 0.75, 1)];
        let chunks = refiner().refine(&sections, &q, 3).await.unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].refined_text, "Soup of the day.");
        assert_eq!(chunks[0].score, 0.75);
        assert_eq!(chunks[0].document, "menu.pdf");
        assert_eq!(chunks[0].page_number, 4);
    }

    #[tokio::test]
    async fn global_budget_drops_lowest_scored_chunks() {
        let q = query("chef", "plan a menu").await;
        // Short sections pass through verbatim, so each carries its own score.
        let sections = vec![
            ranked("a.pdf", "alpha", 1, 0.9, 1),
            ranked("a.pdf", "beta", 2, 0.2, 4),
            ranked("a.pdf", "gamma", 3, 0.7, 2),
            ranked("a.pdf", "delta", 4, 0.4, 3),
        ];
        let chunks = refiner().refine(&sections, &q, 2).await.unwrap();

        assert_eq!(chunks.len(), 2);
        let texts: Vec<&str> = chunks.iter().map(|c| c.refined_text.as_str()).collect();
        assert_eq!(texts, vec!["alpha", "gamma"]);
    }

    #[tokio::test]
    async fn score_ties_prefer_lower_importance_rank() {
        let q = query("chef", "plan a menu").await;
        let sections = vec![
            ranked("a.pdf", "ranked third", 1, 0.5, 3),
            ranked("a.pdf", "ranked first", 2, 0.5, 1),
            ranked("a.pdf", "ranked second", 3, 0.5, 2),
        ];
        let chunks = refiner().refine(&sections, &q, 2).await.unwrap();

        let texts: Vec<&str> = chunks.iter().map(|c| c.refined_text.as_str()).collect();
        assert_eq!(texts, vec!["ranked first", "ranked second"]);
    }

    #[tokio::test]
    async fn long_section_is_condensed_toward_the_query() {
        let text = "The wine tour begins in the historic cellars of Saint-Emilion. \
            Local growers explain the harvest calendar in detail during autumn visits. \
            Museum opening hours vary by season and should be checked in advance always. \
            The wine tasting room offers a guided tour with the resident sommelier daily. \
            Parking is available behind the tourist office for a small hourly fee. \
            Bus lines two and seven stop within walking distance of the old town square.";
        assert!(text.chars().count() >= MIN_CONDENSE_CHARS);

        let q = query("sommelier", "organize a wine tour").await;
        let sections = vec![ranked("guide.pdf", text, 2, 0.8, 1)];
        let chunks = refiner().refine(&sections, &q, 3).await.unwrap();

        assert_eq!(chunks.len(), 1);
        let refined = &chunks[0].refined_text;
        assert!(refined.chars().count() < text.chars().count());
        assert!(refined.contains("wine"));

        // Selected sentences keep their original relative order.
        let cellar = refined.find("cellars");
        let tasting = refined.find("tasting room");
        if let (Some(a), Some(b)) = (cellar, tasting) {
            assert!(a < b);
        }
    }

    #[tokio::test]
    async fn backend_failure_keeps_sections_verbatim() {
        let q = query("sommelier", "organize a wine tour").await;
        let long_text = "One sentence about vineyards. ".repeat(20);
        let sections = vec![ranked("guide.pdf", long_text.trim(), 1, 0.6, 1)];

        let failing = SectionRefiner::new(Arc::new(FailingBackend), &PipelineConfig::default());
        let chunks = failing.refine(&sections, &q, 5).await.unwrap();

        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert_eq!(chunk.score, 0.6);
            assert_eq!(chunk.document, "guide.pdf");
        }
    }

    #[tokio::test]
    async fn chunks_never_invent_locations() {
        let q = query("analyst", "summarize revenue").await;
        let sections = vec![
            ranked("a.pdf", "Revenue grew in the first quarter.", 3, 0.9, 1),
            ranked("b.pdf", "Costs were flat across divisions.", 7, 0.5, 2),
        ];
        let chunks = refiner().refine(&sections, &q, 10).await.unwrap();

        for chunk in &chunks {
            assert!(sections.iter().any(|r| {
                r.section.document == chunk.document && r.section.page_number == chunk.page_number
            }));
        }
    }

    #[test]
    fn oversized_paragraphs_are_windowed() {
        let long = "A sentence that fills some room in the paragraph. ".repeat(40);
        let passages = split_passages(&long);
        assert!(passages.len() > 1);
        for passage in &passages {
            assert!(passage.chars().count() <= MAX_PASSAGE_CHARS + 60);
        }
    }
}
