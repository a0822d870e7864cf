//! Batch collection analysis endpoint

use std::time::Instant;

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::output::save_output;
use crate::pipeline::OUTPUT_FILENAME;
use crate::server::state::AppState;
use crate::types::AnalysisOutput;

/// Request for batch analysis
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    /// Collection name under the configured collections directory
    pub collection: String,
}

/// POST /api/analyze - run the batch pipeline over a named collection
///
/// The result is persisted to the collection's output file and also returned.
pub async fn analyze_collection(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisOutput>> {
    let start = Instant::now();

    // Collection names are plain directory names, never paths.
    if request.collection.is_empty()
        || request.collection.contains(['/', '\\'])
        || request.collection == ".."
    {
        return Err(Error::CollectionNotFound(request.collection));
    }

    tracing::info!("analyze request for collection '{}'", request.collection);

    let collection_dir = state
        .config()
        .extraction
        .collections_dir
        .join(&request.collection);
    let output = state.pipeline().run_collection(&collection_dir).await?;

    save_output(&output, &collection_dir.join(OUTPUT_FILENAME))?;

    tracing::info!(
        "collection '{}' analyzed in {}ms ({} sections, {} groups)",
        request.collection,
        start.elapsed().as_millis(),
        output.extracted_sections.len(),
        output.subsection_analysis.len()
    );

    Ok(Json(output))
}
