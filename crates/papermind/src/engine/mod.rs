//! The relevance ranking and refinement core
//!
//! Stateless per invocation: each stage's output is the next stage's entire
//! input, and nothing survives between invocations. Batch and single-document
//! modes run this exact pipeline.

pub mod aggregator;
pub mod query;
pub mod ranker;
pub mod refiner;
pub mod scorer;

pub use aggregator::group_by_location;
pub use query::PersonaQuery;
pub use ranker::rank_sections;
pub use refiner::SectionRefiner;
pub use scorer::SectionScorer;
