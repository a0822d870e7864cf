//! Importance ranking of scored sections

use crate::error::{Error, Result};
use crate::types::{RankedSection, ScoredSection, Section};

/// Maximum length of a displayed section title
pub const TITLE_MAX_CHARS: usize = 80;

/// Order scored sections by relevance and assign dense importance ranks
///
/// Sorts by score descending with a stable tie-break on input order
/// (documents in store listing order, sections in on-page order), truncates
/// to `top_k`, and assigns ranks `1..=len`. The result length is always
/// `min(top_k, scored.len())`.
pub fn rank_sections(scored: Vec<ScoredSection>, top_k: usize) -> Result<Vec<RankedSection>> {
    if top_k == 0 {
        return Err(Error::Config("ranking top_k must be positive".to_string()));
    }

    let mut sections = scored;
    // Vec::sort_by is stable: equal scores keep their input order.
    sections.sort_by(|a, b| b.score.total_cmp(&a.score));
    sections.truncate(top_k);

    Ok(sections
        .into_iter()
        .enumerate()
        .map(|(index, s)| RankedSection {
            section: s.section,
            score: s.score,
            importance_rank: (index + 1) as u32,
        })
        .collect())
}

/// Title shown for a section: its heading, else the first line of its text
///
/// The 80-character cap applies in both cases.
pub fn display_title(section: &Section) -> String {
    let raw = match section.heading.as_deref() {
        Some(heading) if !heading.trim().is_empty() => heading.trim(),
        _ => section.text.lines().next().unwrap_or("").trim(),
    };
    truncate_chars(raw, TITLE_MAX_CHARS)
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}
