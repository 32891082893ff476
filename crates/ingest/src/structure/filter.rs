//! False-positive boundary filtering.
//!
//! A fixed, ordered list of passes, each enabled per level by the profile.
//! Every pass consumes the previous pass's survivors and keeps line order.

use std::collections::HashMap;

use tracing::debug;

use manual_core::{Boundary, DocumentLines};
use manual_profile::{CompiledProfile, LevelFilters};

/// Inputs shared by every filter pass.
pub struct FilterContext<'a> {
    pub profile: &'a CompiledProfile,
    pub doc: &'a DocumentLines,
}

impl FilterContext<'_> {
    fn filters(&self, level: u32) -> LevelFilters {
        self.profile
            .level(level)
            .map(|l| l.filters)
            .unwrap_or_default()
    }
}

pub type FilterPass = fn(Vec<Boundary>, &FilterContext<'_>) -> Vec<Boundary>;

/// Pass order: cheapest and highest-yield first.
pub const FILTER_PASSES: [(&str, FilterPass); 4] = [
    ("known_id", known_id_pass),
    ("blank_before", blank_before_pass),
    ("min_gap", min_gap_pass),
    ("min_content", min_content_pass),
];

/// Run every pass in [`FILTER_PASSES`] order.
pub fn filter_boundaries(
    boundaries: Vec<Boundary>,
    profile: &CompiledProfile,
    doc: &DocumentLines,
) -> Vec<Boundary> {
    let ctx = FilterContext { profile, doc };
    FILTER_PASSES
        .iter()
        .fold(boundaries, |kept, (name, pass)| {
            let before = kept.len();
            let kept = pass(kept, &ctx);
            debug!(pass = *name, dropped = before - kept.len(), kept = kept.len(), "filter pass");
            kept
        })
}

/// Drop ids missing from a non-empty allow-list.
pub fn known_id_pass(boundaries: Vec<Boundary>, ctx: &FilterContext<'_>) -> Vec<Boundary> {
    boundaries
        .into_iter()
        .filter(|b| {
            let Some(level) = ctx.profile.level(b.level) else {
                return true;
            };
            if !level.filters.require_known_id || level.known_ids.is_empty() {
                return true;
            }
            b.id.as_ref().is_some_and(|id| level.known_ids.contains(id))
        })
        .collect()
}

/// Drop boundaries whose preceding line is not blank. Line 0 has no
/// preceding line and is dropped.
pub fn blank_before_pass(boundaries: Vec<Boundary>, ctx: &FilterContext<'_>) -> Vec<Boundary> {
    boundaries
        .into_iter()
        .filter(|b| {
            !ctx.filters(b.level).require_blank_before
                || (b.line_offset > 0 && ctx.doc.is_blank(b.line_offset - 1))
        })
        .collect()
}

/// Drop a boundary closer than `min_gap_lines` to the last kept boundary of
/// the same level.
pub fn min_gap_pass(boundaries: Vec<Boundary>, ctx: &FilterContext<'_>) -> Vec<Boundary> {
    let mut last_kept: HashMap<u32, usize> = HashMap::new();
    boundaries
        .into_iter()
        .filter(|b| {
            let min_gap = ctx.filters(b.level).min_gap_lines;
            if min_gap > 0 {
                if let Some(&last) = last_kept.get(&b.level) {
                    if b.line_offset - last < min_gap {
                        return false;
                    }
                }
            }
            last_kept.insert(b.level, b.line_offset);
            true
        })
        .collect()
}

/// Drop a boundary with fewer than `min_content_words` words between its own
/// line and the next boundary of any level (or the end of the document).
pub fn min_content_pass(boundaries: Vec<Boundary>, ctx: &FilterContext<'_>) -> Vec<Boundary> {
    let next_offsets: Vec<usize> = boundaries
        .iter()
        .skip(1)
        .map(|b| b.line_offset)
        .chain(std::iter::once(ctx.doc.len()))
        .collect();

    boundaries
        .into_iter()
        .zip(next_offsets)
        .filter(|(b, next)| {
            let min_words = ctx.filters(b.level).min_content_words;
            min_words == 0 || ctx.doc.word_count(b.line_offset..*next) >= min_words
        })
        .map(|(b, _)| b)
        .collect()
}

/// Advisory messages for ids outside a level's allow-list. Unlike
/// [`known_id_pass`] this also reports levels that do not enforce the list.
pub fn validate_boundaries(boundaries: &[Boundary], profile: &CompiledProfile) -> Vec<String> {
    boundaries
        .iter()
        .filter_map(|b| {
            let level = profile.level(b.level)?;
            let id = b.id.as_ref()?;
            if level.known_ids.is_empty() || level.known_ids.contains(id) {
                return None;
            }
            Some(format!(
                "line {}: {} id '{}' is not in known_ids",
                b.line_offset, level.name, id
            ))
        })
        .collect()
}
