//! Result types consumed by the file formatter and the HTTP API

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::persona::Persona;
use super::section::{RankedSection, SubsectionGroup};
use crate::engine::ranker::display_title;

/// Caller-supplied run metadata
///
/// Batch mode fills `input_documents`; single-document mode fills
/// `input_document` and tags itself with `mode: "api"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_documents: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_document: Option<String>,
    pub persona: String,
    pub job_to_be_done: String,
    pub processing_timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

impl Metadata {
    /// Metadata for a batch run over a collection
    pub fn batch(input_documents: Vec<String>, persona: &Persona) -> Self {
        Self {
            input_documents: Some(input_documents),
            input_document: None,
            persona: persona.role.clone(),
            job_to_be_done: persona.task.clone(),
            processing_timestamp: now_timestamp(),
            mode: None,
        }
    }

    /// Metadata for a single uploaded document
    pub fn single(input_document: impl Into<String>, persona: &Persona) -> Self {
        Self {
            input_documents: None,
            input_document: Some(input_document.into()),
            persona: persona.role.clone(),
            job_to_be_done: persona.task.clone(),
            processing_timestamp: now_timestamp(),
            mode: Some("api".to_string()),
        }
    }
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// A ranked section reshaped for the output contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedSection {
    pub document: String,
    pub section_title: String,
    pub importance_rank: u32,
    pub page_number: u32,
}

impl ExtractedSection {
    /// Reshape a ranked section for output
    pub fn from_ranked(ranked: &RankedSection) -> Self {
        Self {
            document: ranked.section.document.clone(),
            section_title: display_title(&ranked.section),
            importance_rank: ranked.importance_rank,
            page_number: ranked.section.page_number,
        }
    }
}

/// The full analysis result shared by batch and single-document modes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutput {
    pub metadata: Metadata,
    pub extracted_sections: Vec<ExtractedSection>,
    pub subsection_analysis: Vec<SubsectionGroup>,
}
