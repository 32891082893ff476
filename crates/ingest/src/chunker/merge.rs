//! Cross-entry merge of undersized chunks within one top-level group.

use tracing::{debug, info};

use manual_core::{LineRange, ManifestEntry, PipelineError, Result};
use manual_profile::ChunkSizes;

/// A chunk before tagging: the entry it belongs to, its absolute line range
/// and its text.
#[derive(Debug, Clone)]
pub struct DraftChunk<'m> {
    pub entry: &'m ManifestEntry,
    pub line_range: LineRange,
    pub text: String,
    pub words: usize,
}

impl<'m> DraftChunk<'m> {
    pub fn new(entry: &'m ManifestEntry, line_range: LineRange, text: String) -> Self {
        let words = manual_core::count_words(&text);
        Self {
            entry,
            line_range,
            text,
            words,
        }
    }

    pub fn level1_id(&self) -> Option<&'m str> {
        self.entry.level1_id()
    }

    pub fn tokens(&self, sizes: &ChunkSizes) -> usize {
        sizes.tokens_for_words(self.words)
    }

    /// Prepend `earlier`'s text. This chunk keeps its entry.
    fn absorb_front(&mut self, earlier: DraftChunk<'m>) {
        self.text = format!("{}\n{}", earlier.text, self.text);
        self.words += earlier.words;
        self.line_range = LineRange::new(
            earlier.line_range.start.min(self.line_range.start),
            earlier.line_range.end.max(self.line_range.end),
        );
    }
}

/// First chunk under `min_tokens` whose successor shares its top-level group
/// and can take it without exceeding `max_merge_tokens`.
fn next_merge(drafts: &[DraftChunk<'_>], sizes: &ChunkSizes) -> Option<usize> {
    drafts.windows(2).position(|pair| {
        let (small, next) = (&pair[0], &pair[1]);
        small.tokens(sizes) < sizes.min_tokens
            && small.level1_id() == next.level1_id()
            && sizes.tokens_for_words(small.words + next.words) <= sizes.max_merge_tokens
    })
}

/// Merge undersized chunks into their successor until no merge applies.
///
/// Every merge removes one chunk, so the loop is capped at the initial
/// count; reaching the cap is reported as an error instead of looping.
pub fn merge_across_entries<'m>(
    mut drafts: Vec<DraftChunk<'m>>,
    sizes: &ChunkSizes,
) -> Result<Vec<DraftChunk<'m>>> {
    let initial = drafts.len();
    for _ in 0..=initial {
        let Some(i) = next_merge(&drafts, sizes) else {
            info!(
                before = initial,
                after = drafts.len(),
                merged = initial - drafts.len(),
                "cross-entry merge complete"
            );
            return Ok(drafts);
        };
        let small = drafts.remove(i);
        debug!(
            from = %small.entry.chunk_id,
            into = %drafts[i].entry.chunk_id,
            words = small.words,
            "merged undersized chunk"
        );
        drafts[i].absorb_front(small);
    }
    Err(PipelineError::MergeDidNotConverge {
        chunks: drafts.len(),
        iterations: initial,
    })
}
