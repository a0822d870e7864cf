//! Configuration for the analysis service

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Ranking and refinement tunables
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Document loading configuration
    #[serde(default)]
    pub extraction: ExtractionConfig,
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read config '{}': {}", path.display(), e))
        })?;
        let config = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("invalid config '{}': {}", path.display(), e)))?;
        Ok(config)
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum upload size in bytes (default: 50MB)
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
            max_upload_size: 50 * 1024 * 1024, // 50MB
        }
    }
}

/// Ranking and refinement tunables
///
/// `ranking_top_k` and `refine_top_k` are independent knobs: the first bounds
/// how many sections are ranked, the second bounds the total number of refined
/// chunks emitted per invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Maximum number of ranked sections (default: 10)
    pub ranking_top_k: usize,
    /// Maximum number of refined chunks per invocation (default: 3)
    pub refine_top_k: usize,
    /// Weight of heading text relative to body text when scoring
    pub heading_weight: f32,
    /// Number of sections scored/refined concurrently (default: CPU count, max 8)
    pub parallel_sections: Option<usize>,
    /// Deadline for scoring plus refinement of one invocation
    pub invocation_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ranking_top_k: 10,
            refine_top_k: 3,
            heading_weight: 2.0,
            parallel_sections: None, // Auto-detect from CPU count
            invocation_timeout_secs: 120,
        }
    }
}

impl PipelineConfig {
    /// Resolve the section worker count
    pub fn section_workers(&self) -> usize {
        self.parallel_sections
            .unwrap_or_else(|| num_cpus::get().min(8))
            .max(1)
    }

    /// Reject unusable tunables before any scoring work begins
    pub fn validate(&self) -> Result<()> {
        if self.ranking_top_k == 0 {
            return Err(Error::Config("ranking_top_k must be positive".to_string()));
        }
        if self.refine_top_k == 0 {
            return Err(Error::Config("refine_top_k must be positive".to_string()));
        }
        Ok(())
    }
}

/// Document loading configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Base directory holding batch collections
    pub collections_dir: PathBuf,
    /// Headingless fragments shorter than this are dropped as extraction noise
    pub min_section_chars: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            collections_dir: PathBuf::from("collections"),
            min_section_chars: 50,
        }
    }
}
