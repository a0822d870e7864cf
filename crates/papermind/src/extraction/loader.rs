//! PDF document loading and sectioning
//!
//! The document store collaborator: turns PDFs into page-tagged sections with
//! heuristically detected headings. Everything here runs before the ranking
//! core and is read-only to it.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use walkdir::WalkDir;

use crate::config::ExtractionConfig;
use crate::error::{Error, Result};
use crate::types::{Document, Section};

/// Lines longer than this are never headings
const MAX_HEADING_CHARS: usize = 90;
/// Headings rarely exceed this many words
const MAX_HEADING_WORDS: usize = 12;

/// Loads PDFs into sectioned documents
pub struct DocumentLoader {
    min_section_chars: usize,
}

impl DocumentLoader {
    /// Create a loader from the extraction configuration
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            min_section_chars: config.min_section_chars,
        }
    }

    /// Load every PDF in a directory, in filename order
    ///
    /// Files that yield no text are skipped with a warning; they do not fail
    /// the whole collection.
    pub fn load_dir(&self, dir: &Path) -> Result<Vec<Document>> {
        if !dir.is_dir() {
            return Err(Error::document_parse(
                dir.display().to_string(),
                "not a directory",
            ));
        }

        let mut documents = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry
                .map_err(|e| Error::internal(format!("cannot list '{}': {}", dir.display(), e)))?;
            let is_pdf = entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
            if !entry.file_type().is_file() || !is_pdf {
                continue;
            }

            let name = entry.file_name().to_string_lossy().to_string();
            let data = std::fs::read(entry.path())?;
            match self.load_bytes(&name, &data) {
                Ok(document) => {
                    tracing::debug!("loaded '{}' ({} sections)", name, document.sections.len());
                    documents.push(document);
                }
                Err(e) => tracing::warn!("skipping '{}': {}", name, e),
            }
        }

        tracing::info!("loaded {} documents from '{}'", documents.len(), dir.display());
        Ok(documents)
    }

    /// Parse one PDF from memory into a sectioned document
    pub fn load_bytes(&self, name: &str, data: &[u8]) -> Result<Document> {
        let pages = extract_pages(name, data)?;

        let mut sections = Vec::new();
        for (index, page_text) in pages.iter().enumerate() {
            let page_number = (index + 1) as u32;
            sections.extend(self.sections_for_page(name, page_number, page_text));
        }

        Ok(Document {
            name: name.to_string(),
            sections,
        })
    }

    /// Split one page of text into sections on heading-like lines
    ///
    /// A page with no detected headings becomes a single section. Headingless
    /// fragments shorter than the configured minimum (running headers, page
    /// numbers) are dropped as extraction noise unless they are the page's
    /// only content.
    fn sections_for_page(&self, document: &str, page_number: u32, text: &str) -> Vec<Section> {
        let mut pending: Vec<(Option<String>, Vec<&str>)> = Vec::new();
        let mut current_heading: Option<String> = None;
        let mut current_body: Vec<&str> = Vec::new();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if is_heading_line(line) {
                pending.push((current_heading.take(), std::mem::take(&mut current_body)));
                current_heading = Some(line.to_string());
            } else {
                current_body.push(line);
            }
        }
        pending.push((current_heading.take(), current_body));

        let mut sections: Vec<Section> = Vec::new();
        let mut fragments: Vec<String> = Vec::new();
        for (heading, body) in pending {
            let body_text = body.join("\n");
            if heading.is_none() && body_text.trim().is_empty() {
                continue;
            }
            if heading.is_none() && body_text.chars().count() < self.min_section_chars {
                fragments.push(body_text);
                continue;
            }

            sections.push(Section {
                document: document.to_string(),
                heading,
                text: body_text,
                page_number,
            });
        }

        if sections.is_empty() && !fragments.is_empty() {
            sections.push(Section {
                document: document.to_string(),
                heading: None,
                text: fragments.join("\n"),
                page_number,
            });
        } else if !fragments.is_empty() {
            tracing::debug!(
                "dropped {} short fragment(s) on page {} of '{}'",
                fragments.len(),
                page_number,
                document
            );
        }

        sections
    }
}

/// Extract per-page text, falling back to whole-document extraction
fn extract_pages(name: &str, data: &[u8]) -> Result<Vec<String>> {
    let raw_pages = match pdf_extract::extract_text_from_mem_by_pages(data) {
        Ok(pages) => pages,
        Err(e) => {
            tracing::warn!(
                "per-page extraction failed for '{}': {}; falling back to whole-document text",
                name,
                e
            );
            vec![pdf_extract::extract_text_from_mem(data)
                .map_err(|e| Error::document_parse(name, e.to_string()))?]
        }
    };

    let pages: Vec<String> = raw_pages.iter().map(|p| clean_page_text(p)).collect();

    if pages.iter().all(|p| p.trim().is_empty()) {
        return Err(Error::document_parse(
            name,
            "no text content could be extracted",
        ));
    }

    // Cross-check against the page tree; a mismatch usually means extraction
    // dropped pages.
    if let Ok(doc) = lopdf::Document::load_mem(data) {
        let declared = doc.get_pages().len();
        if declared != pages.len() {
            tracing::debug!(
                "'{}': extracted {} pages, page tree declares {}",
                name,
                pages.len(),
                declared
            );
        }
    }

    Ok(pages)
}

fn clean_page_text(text: &str) -> String {
    text.replace('\0', "")
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Heuristic: does this line look like a section heading?
fn is_heading_line(line: &str) -> bool {
    static NUMBERED: OnceLock<Regex> = OnceLock::new();
    let numbered = NUMBERED
        .get_or_init(|| Regex::new(r"^\d+(\.\d+)*[.)]?\s+\S").expect("valid heading pattern"));

    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_HEADING_CHARS {
        return false;
    }
    if trimmed.ends_with(['.', ',', ';']) {
        return false;
    }

    let words = trimmed.split_whitespace().count();
    if words > MAX_HEADING_WORDS {
        return false;
    }

    if numbered.is_match(trimmed) {
        return true;
    }

    let letters: Vec<char> = trimmed.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.len() >= 3 && letters.iter().all(|c| c.is_uppercase()) {
        return true;
    }

    // Short Title Case lines: most words capitalized.
    if words <= 8 {
        let capitalized = trimmed
            .split_whitespace()
            .filter(|w| w.chars().next().is_some_and(char::is_uppercase))
            .count();
        if capitalized * 10 >= words * 7 && words >= 2 {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loader() -> DocumentLoader {
        DocumentLoader::new(&ExtractionConfig::default())
    }

    #[test]
    fn heading_detection() {
        assert!(is_heading_line("1. Introduction"));
        assert!(is_heading_line("2.3 Experimental Setup"));
        assert!(is_heading_line("RESULTS AND DISCUSSION"));
        assert!(is_heading_line("Things To Do In Nice"));

        assert!(!is_heading_line("This is an ordinary sentence that ends with a period."));
        assert!(!is_heading_line("the quick brown fox jumps over the lazy dog"));
        assert!(!is_heading_line(""));
        assert!(!is_heading_line(&"word ".repeat(30)));
    }

    #[test]
    fn page_with_headings_splits_into_sections() {
        let page = "Local Cuisine Guide\n\
                    Fresh seafood is served along the entire coastline every evening in summer.\n\
                    Wine Regions Overview\n\
                    The southern slopes produce a crisp white that pairs well with shellfish.";
        let sections = loader().sections_for_page("guide.pdf", 3, page);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].heading.as_deref(), Some("Local Cuisine Guide"));
        assert!(sections[0].text.contains("seafood"));
        assert_eq!(sections[1].heading.as_deref(), Some("Wine Regions Overview"));
        assert!(sections.iter().all(|s| s.page_number == 3));
    }

    #[test]
    fn page_without_headings_is_one_section() {
        let page = "a plain paragraph of body text that goes on for a while without\n\
                    anything resembling a heading anywhere in it at all";
        let sections = loader().sections_for_page("notes.pdf", 1, page);

        assert_eq!(sections.len(), 1);
        assert!(sections[0].heading.is_none());
        assert!(sections[0].text.contains("plain paragraph"));
    }

    #[test]
    fn page_number_noise_before_first_heading_is_dropped() {
        let page = "12\n\
                    Packing Checklist\n\
                    Bring a raincoat, walking shoes and a universal power adapter for the trip.";
        let sections = loader().sections_for_page("guide.pdf", 2, page);

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].heading.as_deref(), Some("Packing Checklist"));
        assert!(!sections[0].text.contains("12"));
    }

    #[test]
    fn lone_fragment_is_kept_as_the_page_content() {
        let sections = loader().sections_for_page("guide.pdf", 5, "closing remarks");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].text, "closing remarks");
    }

    #[test]
    fn empty_page_yields_no_sections() {
        let sections = loader().sections_for_page("guide.pdf", 1, "");
        assert!(sections.is_empty());
    }

    #[test]
    fn missing_directory_is_an_error() {
        let result = loader().load_dir(Path::new("/nonexistent/pdf/dir"));
        assert!(matches!(result, Err(Error::DocumentParse { .. })));
    }

    #[test]
    fn empty_directory_loads_zero_documents() {
        let dir = tempfile::tempdir().unwrap();
        let documents = loader().load_dir(dir.path()).unwrap();
        assert!(documents.is_empty());
    }
}
