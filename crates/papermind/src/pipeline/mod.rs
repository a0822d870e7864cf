//! End-to-end analysis pipeline shared by batch and single-document modes
//!
//! Both modes run the identical core: score → rank → refine → group. Batch
//! mode reads a collection directory and leaves persistence to the output
//! formatter; single-document mode analyzes one uploaded PDF and returns the
//! result directly.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use crate::config::{AppConfig, PipelineConfig};
use crate::engine::{
    group_by_location, rank_sections, PersonaQuery, SectionRefiner, SectionScorer,
};
use crate::error::{Error, Result};
use crate::extraction::{load_persona, DocumentLoader};
use crate::providers::RelevanceBackend;
use crate::types::{
    AnalysisOutput, Document, ExtractedSection, Metadata, Persona, RankedSection, Section,
    SubsectionGroup,
};

/// Collection input file carrying the persona and job-to-be-done
pub const INPUT_FILENAME: &str = "challenge1b_input.json";
/// Batch output file written next to the input
pub const OUTPUT_FILENAME: &str = "challenge1b_output.json";
/// Subdirectory of a collection holding its PDFs
pub const PDF_SUBDIR: &str = "PDFs";

/// The analysis pipeline
pub struct Pipeline {
    config: PipelineConfig,
    loader: DocumentLoader,
    scorer: SectionScorer,
    refiner: SectionRefiner,
    backend: Arc<dyn RelevanceBackend>,
}

impl Pipeline {
    /// Create a pipeline around a shared relevance backend
    pub fn new(backend: Arc<dyn RelevanceBackend>, config: &AppConfig) -> Self {
        Self {
            config: config.pipeline.clone(),
            loader: DocumentLoader::new(&config.extraction),
            scorer: SectionScorer::new(Arc::clone(&backend), &config.pipeline),
            refiner: SectionRefiner::new(Arc::clone(&backend), &config.pipeline),
            backend,
        }
    }

    /// Run the batch pipeline over one collection directory
    ///
    /// Reads `PDFs/` and the persona input under `collection_dir`, returns the
    /// full result. Persistence is the output formatter's job, invoked
    /// separately by the caller.
    pub async fn run_collection(&self, collection_dir: &Path) -> Result<AnalysisOutput> {
        if !collection_dir.is_dir() {
            return Err(Error::CollectionNotFound(
                collection_dir.display().to_string(),
            ));
        }

        let persona = load_persona(&collection_dir.join(INPUT_FILENAME))?;
        let documents = self.loader.load_dir(&collection_dir.join(PDF_SUBDIR))?;
        tracing::info!(
            "analyzing collection '{}': {} documents, persona '{}'",
            collection_dir.display(),
            documents.len(),
            persona.role
        );

        let (ranked, groups) = self.analyze(&documents, &persona).await?;
        let names = documents.iter().map(|d| d.name.clone()).collect();
        Ok(assemble(Metadata::batch(names, &persona), ranked, groups))
    }

    /// Run the single-document pipeline on an uploaded PDF
    ///
    /// Writes nothing; the result is returned directly.
    pub async fn run_single(
        &self,
        filename: &str,
        data: &[u8],
        persona: &Persona,
    ) -> Result<AnalysisOutput> {
        let document = self.loader.load_bytes(filename, data)?;
        tracing::info!(
            "analyzing '{}': {} sections, persona '{}'",
            filename,
            document.sections.len(),
            persona.role
        );

        let documents = vec![document];
        let (ranked, groups) = self.analyze(&documents, persona).await?;
        Ok(assemble(Metadata::single(filename, persona), ranked, groups))
    }

    /// The shared core: score → rank → refine → group
    ///
    /// An empty document set is a valid outcome, not an error. The whole
    /// invocation is bounded by the configured deadline; on expiry it fails
    /// with no partial result.
    pub async fn analyze(
        &self,
        documents: &[Document],
        persona: &Persona,
    ) -> Result<(Vec<RankedSection>, Vec<SubsectionGroup>)> {
        self.config.validate()?;

        let sections: Vec<Section> = documents
            .iter()
            .flat_map(|d| d.sections.iter().cloned())
            .collect();
        if sections.is_empty() {
            tracing::info!("no sections to analyze");
            return Ok((Vec::new(), Vec::new()));
        }

        let deadline = Duration::from_secs(self.config.invocation_timeout_secs);
        // Box the inner future into a concrete `Send` trait object so the
        // compiler proves `Send` at this concrete lifetime rather than a
        // higher-ranked one it cannot reason about through the async handler.
        let work: Pin<
            Box<dyn Future<Output = Result<(Vec<RankedSection>, Vec<SubsectionGroup>)>> + Send + '_>,
        > = Box::pin(self.analyze_sections(sections, persona));
        timeout(deadline, work)
            .await
            .map_err(|_| Error::Timeout(self.config.invocation_timeout_secs))?
    }

    async fn analyze_sections(
        &self,
        sections: Vec<Section>,
        persona: &Persona,
    ) -> Result<(Vec<RankedSection>, Vec<SubsectionGroup>)> {
        // Box the backend-bound futures into concrete `Send` trait objects so
        // the enclosing future is provably `Send`; rustc otherwise fails to
        // prove `Send` for the higher-ranked borrow of the shared backend.
        let query_fut: Pin<Box<dyn Future<Output = Result<PersonaQuery>> + Send + '_>> =
            Box::pin(PersonaQuery::build(&self.backend, persona));
        let query = query_fut.await?;

        let scored = self.scorer.score(&sections, &query).await?;
        let ranked = rank_sections(scored, self.config.ranking_top_k)?;
        let chunks = self
            .refiner
            .refine(&ranked, &query, self.config.refine_top_k)
            .await?;
        let groups = group_by_location(&chunks);

        tracing::debug!(
            "ranked {} of {} sections, refined into {} chunks across {} groups",
            ranked.len(),
            sections.len(),
            chunks.len(),
            groups.len()
        );
        Ok((ranked, groups))
    }
}

fn assemble(
    metadata: Metadata,
    ranked: Vec<RankedSection>,
    groups: Vec<SubsectionGroup>,
) -> AnalysisOutput {
    AnalysisOutput {
        metadata,
        extracted_sections: ranked.iter().map(ExtractedSection::from_ranked).collect(),
        subsection_analysis: groups,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::LexicalEmbedder;

    fn pipeline() -> Pipeline {
        let backend: Arc<dyn RelevanceBackend> = Arc::new(LexicalEmbedder::default());
        Pipeline::new(backend, &AppConfig::default())
    }

    fn pipeline_with(config: AppConfig) -> Pipeline {
        let backend: Arc<dyn RelevanceBackend> = Arc::new(LexicalEmbedder::default());
        Pipeline::new(backend, &config)
    }

    fn document(name: &str, sections: &[(Option<&str>, &str, u32)]) -> Document {
        Document {
            name: name.to_string(),
            sections: sections
                .iter()
                .map(|(heading, text, page)| Section {
                    document: name.to_string(),
                    heading: heading.map(str::to_string),
                    text: text.to_string(),
                    page_number: *page,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn empty_corpus_yields_empty_results() {
        let persona = Persona::new("researcher", "review methods");
        let (ranked, groups) = pipeline().analyze(&[], &persona).await.unwrap();
        assert!(ranked.is_empty());
        assert!(groups.is_empty());
    }

    #[tokio::test]
    async fn single_headingless_section_is_titled_by_first_line() {
        let docs = vec![document("doc.pdf", &[(None, "Intro\nBody text here", 1)])];
        let persona = Persona::new("general reader", "extract key sections");
        let (ranked, _) = pipeline().analyze(&docs, &persona).await.unwrap();

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].importance_rank, 1);
        let extracted = ExtractedSection::from_ranked(&ranked[0]);
        assert_eq!(extracted.section_title, "Intro");
    }

    #[tokio::test]
    async fn same_page_chunks_group_together() {
        let docs = vec![document(
            "menu.pdf",
            &[
                (Some("Starters"), "Seasonal vegetable soup with bread.", 2),
                (Some("Mains"), "Grilled vegetable skewers with rice.", 2),
                (Some("Desserts"), "Fruit salad with mint and honey.", 2),
            ],
        )];
        let persona = Persona::new("chef", "plan a vegetarian menu");
        let (_, groups) = pipeline().analyze(&docs, &persona).await.unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].document, "menu.pdf");
        assert_eq!(groups[0].page_number, 2);
        assert_eq!(groups[0].refined_chunks.len(), 3);
    }

    #[tokio::test]
    async fn refine_budget_bounds_total_chunks() {
        let docs = vec![document(
            "guide.pdf",
            &[
                (Some("Wine Tours"), "A guided wine tour with tastings.", 1),
                (Some("Museums"), "Opening hours for the museums.", 2),
                (Some("Beaches"), "A list of accessible beaches.", 3),
                (Some("Transport"), "Bus and train schedules.", 4),
                (Some("Hotels"), "Where to stay on a budget.", 5),
            ],
        )];
        let persona = Persona::new("sommelier", "organize a wine tour");
        let (ranked, groups) = pipeline().analyze(&docs, &persona).await.unwrap();

        assert_eq!(ranked.len(), 5);
        let total_chunks: usize = groups.iter().map(|g| g.refined_chunks.len()).sum();
        assert_eq!(total_chunks, 3); // default refine_top_k
    }

    #[tokio::test]
    async fn pipeline_is_deterministic() {
        let docs = vec![
            document(
                "a.pdf",
                &[
                    (Some("Nightlife"), "Bars and clubs open late downtown.", 1),
                    (None, "General visitor information and contacts.", 2),
                ],
            ),
            document(
                "b.pdf",
                &[
                    (Some("Cuisine"), "Regional dishes and where to try them.", 1),
                    (Some("Day Trips"), "Villages reachable within an hour.", 4),
                ],
            ),
        ];
        let persona = Persona::new("college student", "plan an affordable weekend");

        let p = pipeline();
        let (ranked_a, groups_a) = p.analyze(&docs, &persona).await.unwrap();
        let (ranked_b, groups_b) = p.analyze(&docs, &persona).await.unwrap();

        let sections_a: Vec<ExtractedSection> =
            ranked_a.iter().map(ExtractedSection::from_ranked).collect();
        let sections_b: Vec<ExtractedSection> =
            ranked_b.iter().map(ExtractedSection::from_ranked).collect();
        assert_eq!(sections_a, sections_b);
        assert_eq!(
            serde_json::to_string(&groups_a).unwrap(),
            serde_json::to_string(&groups_b).unwrap()
        );
    }

    #[tokio::test]
    async fn invalid_top_k_fails_before_scoring() {
        let mut config = AppConfig::default();
        config.pipeline.ranking_top_k = 0;
        let docs = vec![document("doc.pdf", &[(None, "some text", 1)])];
        let persona = Persona::new("reader", "read");

        let result = pipeline_with(config).analyze(&docs, &persona).await;
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn ranking_is_bounded_by_top_k() {
        let mut config = AppConfig::default();
        config.pipeline.ranking_top_k = 2;
        let docs = vec![document(
            "doc.pdf",
            &[
                (None, "first section about travel", 1),
                (None, "second section about food", 2),
                (None, "third section about hotels", 3),
            ],
        )];
        let persona = Persona::new("traveler", "plan a trip");

        let (ranked, _) = pipeline_with(config)
            .analyze(&docs, &persona)
            .await
            .unwrap();
        assert_eq!(ranked.len(), 2);
        let ranks: Vec<u32> = ranked.iter().map(|r| r.importance_rank).collect();
        assert_eq!(ranks, vec![1, 2]);
    }

    #[tokio::test]
    async fn missing_collection_dir_is_not_found() {
        let result = pipeline()
            .run_collection(Path::new("/nonexistent/collection"))
            .await;
        assert!(matches!(result, Err(Error::CollectionNotFound(_))));
    }
}
