//! Builds the manifest tree from the filtered boundary list.

use std::collections::{HashMap, HashSet};

use tracing::info;

use manual_core::{
    format_chunk_id, sanitize_segment, Boundary, DocumentLines, LineRange, Manifest,
    ManifestEntry, PageRange,
};
use manual_profile::CompiledProfile;

/// Path segment for a boundary: its id, else its title, else `{level_name}-{n}`.
fn raw_segment(boundary: &Boundary, position: usize) -> String {
    let candidate = boundary
        .id
        .as_deref()
        .or(boundary.title.as_deref())
        .map(sanitize_segment)
        .filter(|s| !s.is_empty());
    candidate.unwrap_or_else(|| format!("{}-{}", boundary.level_name, position + 1))
}

/// Suffix `-2`, `-3`, … until the segment is unused among its siblings.
fn unique_segment(raw: String, used: &mut HashSet<String>) -> String {
    let mut segment = raw.clone();
    let mut n = 2;
    while used.contains(&segment) {
        segment = format!("{raw}-{n}");
        n += 1;
    }
    used.insert(segment.clone());
    segment
}

/// Walk boundaries in order with an ancestor stack keyed by level.
pub fn build_manifest(
    boundaries: &[Boundary],
    profile: &CompiledProfile,
    doc: &DocumentLines,
) -> Manifest {
    let mut manifest = Manifest::new(profile.manual_id.clone());
    // (level, index into manifest.entries)
    let mut stack: Vec<(u32, usize)> = Vec::new();
    // Segments already used under each parent (None = top level).
    let mut used: HashMap<Option<usize>, HashSet<String>> = HashMap::new();

    for (i, boundary) in boundaries.iter().enumerate() {
        while stack.last().is_some_and(|&(level, _)| level >= boundary.level) {
            stack.pop();
        }
        let parent = stack.last().map(|&(_, idx)| idx);

        let segment = unique_segment(
            raw_segment(boundary, i),
            used.entry(parent).or_default(),
        );
        let mut hierarchy_path = parent
            .map(|p| manifest.entries[p].hierarchy_path.clone())
            .unwrap_or_default();
        hierarchy_path.push(segment);
        let chunk_id = format_chunk_id(&manifest.manual_id, &hierarchy_path);

        let end = boundaries[i + 1..]
            .iter()
            .find(|next| next.level <= boundary.level)
            .map_or(doc.len(), |next| next.line_offset);
        let line_range = LineRange::new(boundary.line_offset, end);
        let last_page = if line_range.is_empty() {
            boundary.page_number
        } else {
            doc.page_of(end - 1).unwrap_or(boundary.page_number)
        };

        let title = boundary
            .title
            .clone()
            .or_else(|| boundary.id.clone())
            .unwrap_or_else(|| boundary.level_name.clone());

        let parent_chunk_id = parent.map(|p| manifest.entries[p].chunk_id.clone());
        if let Some(p) = parent {
            manifest.entries[p].children.push(chunk_id.clone());
        }
        manifest.entries.push(ManifestEntry {
            chunk_id,
            level: boundary.level,
            level_name: boundary.level_name.clone(),
            title,
            hierarchy_path,
            parent_chunk_id,
            children: Vec::new(),
            content_type: boundary.level_name.clone(),
            page_range: PageRange {
                start: boundary.page_number,
                end: last_page,
            },
            line_range,
        });
        stack.push((boundary.level, manifest.entries.len() - 1));
    }

    info!(
        manual_id = %manifest.manual_id,
        entries = manifest.entries.len(),
        roots = manifest.roots().count(),
        "built manifest"
    );
    manifest
}
