//! papermind: persona-driven document section analysis
//!
//! Extracts, ranks, and condenses the sections of one or more PDF documents
//! most relevant to a stated reader persona and job-to-be-done. The ranking
//! core (scorer → ranker → refiner → aggregator) is deterministic and
//! stateless per invocation; batch collections and single uploads run the
//! same pipeline.

pub mod config;
pub mod engine;
pub mod error;
pub mod extraction;
pub mod output;
pub mod pipeline;
pub mod providers;
pub mod server;
pub mod types;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use pipeline::Pipeline;
pub use providers::{LexicalEmbedder, RelevanceBackend};
pub use types::{
    persona::Persona,
    response::{AnalysisOutput, ExtractedSection, Metadata},
    section::{Document, RankedSection, RefinedChunk, ScoredSection, Section, SubsectionGroup},
};
