//! Boundary quality report used when tuning a profile.

use std::collections::BTreeMap;

use serde::Serialize;

use manual_core::{Boundary, DocumentLines};

/// Boundaries followed by this many words or fewer are likely noise.
pub const FALSE_POSITIVE_MAX_WORDS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuspectBoundary {
    pub line_offset: usize,
    pub page_number: usize,
    pub level: u32,
    pub id: Option<String>,
    pub title: Option<String>,
    pub content_words: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BoundaryDiagnostics {
    pub total: usize,
    /// Level name → boundary count.
    pub per_level: BTreeMap<String, usize>,
    /// Words after each boundary's own line up to the next boundary.
    pub content_words: Vec<usize>,
    pub min_words: usize,
    pub median_words: usize,
    pub max_words: usize,
    pub suspected_false_positives: Vec<SuspectBoundary>,
}

impl BoundaryDiagnostics {
    pub fn compute(boundaries: &[Boundary], doc: &DocumentLines) -> Self {
        let mut per_level = BTreeMap::new();
        for b in boundaries {
            *per_level.entry(b.level_name.clone()).or_insert(0) += 1;
        }

        let content_words: Vec<usize> = boundaries
            .iter()
            .enumerate()
            .map(|(i, b)| {
                let next = boundaries.get(i + 1).map_or(doc.len(), |n| n.line_offset);
                doc.word_count(b.line_offset + 1..next)
            })
            .collect();

        let suspected_false_positives = boundaries
            .iter()
            .zip(&content_words)
            .filter(|(_, &words)| words <= FALSE_POSITIVE_MAX_WORDS)
            .map(|(b, &words)| SuspectBoundary {
                line_offset: b.line_offset,
                page_number: b.page_number,
                level: b.level,
                id: b.id.clone(),
                title: b.title.clone(),
                content_words: words,
            })
            .collect();

        let mut sorted = content_words.clone();
        sorted.sort_unstable();

        Self {
            total: boundaries.len(),
            per_level,
            min_words: sorted.first().copied().unwrap_or(0),
            median_words: sorted.get(sorted.len() / 2).copied().unwrap_or(0),
            max_words: sorted.last().copied().unwrap_or(0),
            content_words,
            suspected_false_positives,
        }
    }
}
