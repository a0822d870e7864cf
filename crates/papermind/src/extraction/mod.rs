//! Document and persona loading collaborators
//!
//! Narrow, stable interfaces feeding the ranking core: PDFs in, sectioned
//! documents out; persona JSON in, a validated two-field persona out.

pub mod loader;
pub mod persona;

pub use loader::DocumentLoader;
pub use persona::{load_persona, parse_persona};
