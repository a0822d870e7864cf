//! JSON file persistence for batch results

use std::path::Path;

use crate::error::Result;
use crate::types::AnalysisOutput;

/// Write an analysis result as pretty-printed JSON
pub fn save_output(output: &AnalysisOutput, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(output)?;
    std::fs::write(path, json)?;

    tracing::info!("wrote analysis output to '{}'", path.display());
    Ok(())
}
