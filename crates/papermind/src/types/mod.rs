//! Core data types shared across extraction, ranking, and the server

pub mod persona;
pub mod response;
pub mod section;

pub use persona::Persona;
pub use response::{AnalysisOutput, ExtractedSection, Metadata};
pub use section::{
    Document, RankedSection, RefinedChunk, RefinedText, ScoredSection, Section, SubsectionGroup,
};
