//! Single-document upload endpoint

use std::time::Instant;

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{AnalysisOutput, Persona};

/// POST /api/parse - analyze one uploaded PDF
///
/// Multipart fields: `file` (required), `persona` and `job` (optional; blank
/// values fall back to the generic defaults). Nothing is persisted.
pub async fn parse_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisOutput>> {
    let start = Instant::now();

    let mut filename: Option<String> = None;
    let mut data: Option<Bytes> = None;
    let mut role: Option<String> = None;
    let mut task: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Config(format!("invalid multipart payload: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                filename = field.file_name().map(str::to_string);
                data = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| Error::Config(format!("failed to read upload: {}", e)))?,
                );
            }
            Some("persona") => {
                role = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| Error::Config(format!("invalid persona field: {}", e)))?,
                );
            }
            Some("job") => {
                task = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| Error::Config(format!("invalid job field: {}", e)))?,
                );
            }
            _ => {}
        }
    }

    let data = data.ok_or_else(|| Error::Config("missing 'file' field".to_string()))?;
    let filename = filename.unwrap_or_else(|| "upload.pdf".to_string());
    let persona = Persona::with_defaults(role, task);

    tracing::info!(
        "parse request: '{}' ({} bytes), persona '{}'",
        filename,
        data.len(),
        persona.role
    );

    let output = state
        .pipeline()
        .run_single(&filename, &data, &persona)
        .await?;

    tracing::info!(
        "'{}' analyzed in {}ms ({} sections, {} groups)",
        filename,
        start.elapsed().as_millis(),
        output.extracted_sections.len(),
        output.subsection_analysis.len()
    );

    Ok(Json(output))
}
