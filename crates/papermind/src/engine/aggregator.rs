//! Grouping of refined chunks by document and page

use std::collections::HashMap;

use crate::types::{RefinedChunk, RefinedText, SubsectionGroup};

/// Group chunks by `(document, page_number)`
///
/// Pure and total. Groups appear in first-occurrence order of their key, so
/// the refiner's relevance-driven ordering survives; within a group, chunks
/// keep their input order. Regrouping is lossless: every input chunk lands in
/// exactly one group.
pub fn group_by_location(chunks: &[RefinedChunk]) -> Vec<SubsectionGroup> {
    let mut groups: Vec<SubsectionGroup> = Vec::new();
    let mut index: HashMap<(&str, u32), usize> = HashMap::new();

    for chunk in chunks {
        let body = RefinedText {
            refined_text: chunk.refined_text.clone(),
            score: chunk.score,
        };
        match index.get(&(chunk.document.as_str(), chunk.page_number)) {
            Some(&position) => groups[position].refined_chunks.push(body),
            None => {
                index.insert((chunk.document.as_str(), chunk.page_number), groups.len());
                groups.push(SubsectionGroup {
                    document: chunk.document.clone(),
                    page_number: chunk.page_number,
                    refined_chunks: vec![body],
                });
            }
        }
    }

    groups
}
