//! Persona and job-to-be-done driving relevance

use serde::{Deserialize, Serialize};

/// Role assumed when the caller supplies none
pub const DEFAULT_ROLE: &str = "general reader";
/// Task assumed when the caller supplies none
pub const DEFAULT_TASK: &str = "extract key sections";

/// The reader persona and the task it is trying to accomplish
///
/// Exactly two fields, both required. Callers default missing values via
/// [`Persona::with_defaults`]; the engine itself never substitutes defaults
/// and treats an empty persona as a request for non-personalized relevance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    /// Reader role (e.g., "PhD researcher")
    pub role: String,
    /// Job-to-be-done (e.g., "prepare a literature review")
    pub task: String,
}

impl Persona {
    /// Create a persona from explicit role and task
    pub fn new(role: impl Into<String>, task: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            task: task.into(),
        }
    }

    /// Build a persona at the caller boundary, defaulting blank fields
    pub fn with_defaults(role: Option<String>, task: Option<String>) -> Self {
        let role = role
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_ROLE.to_string());
        let task = task
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TASK.to_string());
        Self { role, task }
    }
}
