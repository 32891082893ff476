//! Chunk assembly: per-entry detection and rule pipeline, the cross-entry
//! merge, then tagging.

mod detect;
mod enrich;
mod merge;
mod rules;
mod types;

pub use detect::{
    detect_figure_references, detect_safety_callouts, detect_spans, detect_step_sequences,
    detect_tables, safety_attachments, FIRST_ORDINALS,
};
pub use enrich::{
    compose_hierarchical_header, finalize_chunks, structural_features, tag_applicability,
    Applicability, StructuralFeatures,
};
pub use merge::{merge_across_entries, DraftChunk};
pub use rules::{
    apply_rules, cross_ref_merge, figure_continuity, merge_small, never_split_steps,
    primary_unit, safety_attachment, size_ceiling, table_integrity, RuleFn, RuleId,
    RULE_PIPELINE,
};
pub use types::*;

use std::collections::HashMap;

use tracing::{debug, info};

use manual_core::{
    Chunk, DocumentLines, LineRange, Manifest, ManifestEntry, PageRange, Result,
};
use manual_profile::{CompiledProfile, EmptyDocumentPolicy};

/// Level name of the implicit entry used when no boundary survived.
pub const WHOLE_DOCUMENT_LEVEL: &str = "document";

/// Run `pipeline` over one block of text.
pub fn plan_lines_with(
    pipeline: &[(RuleId, RuleFn)],
    lines: &[String],
    profile: &CompiledProfile,
) -> ChunkPlan {
    let spans = detect_spans(lines, profile);
    let ctx = EntryContext::new(lines, profile, &spans);
    apply_rules(pipeline, &ctx)
}

pub fn plan_lines(lines: &[String], profile: &CompiledProfile) -> ChunkPlan {
    plan_lines_with(&RULE_PIPELINE, lines, profile)
}

/// Range of the entry's own text: up to its first child, which owns the rest.
fn own_range(entry: &ManifestEntry, index: &HashMap<&str, &ManifestEntry>) -> LineRange {
    let end = entry
        .children
        .first()
        .and_then(|child| index.get(child.as_str()))
        .map_or(entry.line_range.end, |child| child.line_range.start);
    LineRange::new(entry.line_range.start, end.max(entry.line_range.start))
}

/// `span` with leading and trailing blank lines dropped.
fn trim_blank(lines: &[String], span: Span) -> Span {
    let blank = |i: usize| lines[i].trim().is_empty();
    let mut start = span.start;
    let mut end = span.end.min(lines.len());
    while start < end && blank(start) {
        start += 1;
    }
    while end > start && blank(end - 1) {
        end -= 1;
    }
    Span::new(start, end)
}

fn entry_drafts<'m>(
    entry: &'m ManifestEntry,
    range: LineRange,
    doc: &DocumentLines,
    profile: &CompiledProfile,
) -> Vec<DraftChunk<'m>> {
    let raw = doc.slice(range.start..range.end);
    let text_span = trim_blank(raw, Span::new(0, raw.len()));
    if text_span.is_empty() {
        return Vec::new();
    }
    let lines = &raw[text_span.start..text_span.end];
    let base = range.start + text_span.start;

    plan_lines(lines, profile)
        .candidates
        .into_iter()
        .map(|c| trim_blank(lines, c))
        .filter(|c| !c.is_empty())
        .map(|c| {
            DraftChunk::new(
                entry,
                LineRange::new(base + c.start, base + c.end),
                lines[c.start..c.end].join("\n"),
            )
        })
        .collect()
}

fn assemble_entries(
    manifest: &Manifest,
    doc: &DocumentLines,
    profile: &CompiledProfile,
) -> Result<Vec<Chunk>> {
    let index = manifest.index();
    let mut drafts = Vec::new();
    let mut skipped = 0usize;

    for entry in &manifest.entries {
        if entry.level1_id().is_some_and(|id| profile.is_skipped(id)) {
            skipped += 1;
            continue;
        }
        let range = own_range(entry, &index);
        let entry_chunks = entry_drafts(entry, range, doc, profile);
        debug!(entry = %entry.chunk_id, chunks = entry_chunks.len(), "planned entry");
        drafts.extend(entry_chunks);
    }

    let planned = drafts.len();
    let merged = merge_across_entries(drafts, &profile.sizes)?;
    let chunks = finalize_chunks(merged, manifest, doc, profile);
    info!(
        manual_id = %profile.manual_id,
        entries = manifest.entries.len(),
        skipped,
        planned,
        chunks = chunks.len(),
        "assembled chunks"
    );
    Ok(chunks)
}

/// One entry spanning the whole document, id = `manual_id`.
fn whole_document_manifest(doc: &DocumentLines, profile: &CompiledProfile) -> Manifest {
    let mut manifest = Manifest::new(profile.manual_id.clone());
    manifest.entries.push(ManifestEntry {
        chunk_id: profile.manual_id.clone(),
        level: 0,
        level_name: WHOLE_DOCUMENT_LEVEL.to_string(),
        title: profile.manual_title.clone(),
        hierarchy_path: Vec::new(),
        parent_chunk_id: None,
        children: Vec::new(),
        content_type: WHOLE_DOCUMENT_LEVEL.to_string(),
        page_range: PageRange {
            start: 0,
            end: doc.page_count().saturating_sub(1),
        },
        line_range: LineRange::new(0, doc.len()),
    });
    manifest
}

/// Turn a manifest into the final ordered chunk list.
///
/// Entries of skipped top-level groups produce nothing. An empty manifest
/// follows the profile's `empty_document` policy.
pub fn assemble_chunks(
    manifest: &Manifest,
    doc: &DocumentLines,
    profile: &CompiledProfile,
) -> Result<Vec<Chunk>> {
    if !manifest.is_empty() {
        return assemble_entries(manifest, doc, profile);
    }
    match profile.sizes.empty_document {
        EmptyDocumentPolicy::NoChunks => {
            info!(manual_id = %profile.manual_id, "no boundaries; producing no chunks");
            Ok(Vec::new())
        }
        EmptyDocumentPolicy::WholeDocument => {
            info!(manual_id = %profile.manual_id, "no boundaries; chunking whole document");
            let whole = whole_document_manifest(doc, profile);
            assemble_entries(&whole, doc, profile)
        }
    }
}

#[cfg(test)]
mod tests;
