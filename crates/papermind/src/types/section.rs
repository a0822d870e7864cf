//! Section types flowing through the ranking and refinement pipeline
//!
//! `Document` and `Section` are produced by the loader and are read-only to
//! the engine. Everything downstream (`ScoredSection`, `RankedSection`,
//! `RefinedChunk`, `SubsectionGroup`) is derived per invocation and never
//! mutated after construction.

use serde::{Deserialize, Serialize};

/// A document loaded from the document store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Document name (source filename)
    pub name: String,
    /// Page-tagged sections in on-page order
    pub sections: Vec<Section>,
}

/// A contiguous span of document text tagged with its origin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    /// Name of the document this section came from
    pub document: String,
    /// Detected heading, if any
    pub heading: Option<String>,
    /// Body text
    pub text: String,
    /// Page number (1-indexed)
    pub page_number: u32,
}

/// A section with its relevance score against the persona query
#[derive(Debug, Clone)]
pub struct ScoredSection {
    pub section: Section,
    /// Non-negative, finite; higher is more relevant
    pub score: f64,
}

/// A scored section with its importance rank
///
/// Ranks are dense and unique: the ranker emits at most `top_k` of these with
/// ranks exactly `1..=len`, ordered by rank ascending.
#[derive(Debug, Clone)]
pub struct RankedSection {
    pub section: Section,
    pub score: f64,
    /// 1-based position after relevance sorting
    pub importance_rank: u32,
}

/// A condensed, persona-relevant excerpt derived from a ranked section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinedChunk {
    pub document: String,
    pub page_number: u32,
    pub refined_text: String,
    /// Chunk-level relevance, derived consistently with the section score
    pub score: f64,
}

/// Chunk body as serialized inside a subsection group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinedText {
    pub refined_text: String,
    pub score: f64,
}

/// Refined chunks grouped by their location
///
/// Unique per `(document, page_number)` pair; chunks from distinct sections on
/// the same page share one group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubsectionGroup {
    pub document: String,
    pub page_number: u32,
    pub refined_chunks: Vec<RefinedText>,
}
