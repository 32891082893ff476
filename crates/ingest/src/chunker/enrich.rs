//! Tagging and metadata for final chunks.

use std::collections::{BTreeSet, HashMap};

use regex::Regex;

use manual_core::{
    part_chunk_id, CalloutLevel, Chunk, ChunkMetadata, DocumentLines, Manifest, PageRange,
    APPLIES_TO_ALL,
};
use manual_profile::{AliasMatcher, CompiledProfile};

use super::merge::DraftChunk;

/// `"{manual_title} | t1 | t2 …"`.
pub fn compose_hierarchical_header<S: AsRef<str>>(manual_title: &str, titles: &[S]) -> String {
    std::iter::once(manual_title)
        .chain(titles.iter().map(AsRef::as_ref))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" | ")
}

fn matching_tags(matchers: &[AliasMatcher], text: &str) -> Vec<String> {
    let tags: BTreeSet<&str> = matchers
        .iter()
        .filter(|m| m.is_match(text))
        .map(|m| m.tag.as_str())
        .collect();
    if tags.is_empty() {
        vec![APPLIES_TO_ALL.to_string()]
    } else {
        tags.into_iter().map(str::to_string).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applicability {
    pub vehicle_models: Vec<String>,
    pub engines: Vec<String>,
    pub drivetrains: Vec<String>,
}

/// Scan text against the profile's alias tables. Each category falls back to
/// `["all"]`.
pub fn tag_applicability(text: &str, profile: &CompiledProfile) -> Applicability {
    let tables = &profile.applicability;
    Applicability {
        vehicle_models: matching_tags(&tables.vehicles, text),
        engines: matching_tags(&tables.engines, text),
        drivetrains: matching_tags(&tables.drivetrains, text),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuralFeatures {
    pub safety_levels: Vec<CalloutLevel>,
    pub figure_references: Vec<String>,
    /// Qualified with the manual namespace.
    pub cross_references: Vec<String>,
}

fn capture_ids<'a>(re: &'a Regex, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    re.captures_iter(text).filter_map(|caps| {
        caps.get(1)
            .or_else(|| caps.get(0))
            .map(|m| m.as_str().trim())
    })
}

pub fn structural_features(text: &str, profile: &CompiledProfile) -> StructuralFeatures {
    let safety_levels: BTreeSet<CalloutLevel> = text
        .lines()
        .map(str::trim)
        .flat_map(|line| {
            profile
                .safety_callouts
                .iter()
                .filter(move |c| c.pattern.is_match(line))
                .map(|c| c.level)
        })
        .collect();

    let figure_references: BTreeSet<String> = profile
        .figure_reference
        .iter()
        .flat_map(|re| capture_ids(re, text))
        .map(str::to_string)
        .collect();

    let cross_references: BTreeSet<String> = profile
        .cross_references
        .iter()
        .flat_map(|re| capture_ids(re, text))
        .filter(|target| !target.is_empty())
        .map(|target| profile.qualify(target))
        .collect();

    StructuralFeatures {
        safety_levels: safety_levels.into_iter().collect(),
        figure_references: figure_references.into_iter().collect(),
        cross_references: cross_references.into_iter().collect(),
    }
}

/// Assign part ids and attach metadata. Parts are numbered per entry in
/// output order, so an entry whose first chunk merged away still starts at
/// its bare chunk id.
pub fn finalize_chunks(
    drafts: Vec<DraftChunk<'_>>,
    manifest: &Manifest,
    doc: &DocumentLines,
    profile: &CompiledProfile,
) -> Vec<Chunk> {
    let mut parts: HashMap<&str, usize> = HashMap::new();
    drafts
        .into_iter()
        .map(|draft| {
            let entry = draft.entry;
            let part = parts.entry(entry.chunk_id.as_str()).or_insert(0);
            *part += 1;
            let chunk_id = part_chunk_id(&entry.chunk_id, *part);

            let titles: Vec<&str> = manifest
                .ancestry(&entry.chunk_id)
                .into_iter()
                .map(|e| e.title.as_str())
                .collect();
            let range = draft.line_range;
            let page_range = if range.is_empty() {
                entry.page_range
            } else {
                PageRange {
                    start: doc.page_of(range.start).unwrap_or(entry.page_range.start),
                    end: doc.page_of(range.end - 1).unwrap_or(entry.page_range.end),
                }
            };

            let applicability = tag_applicability(&draft.text, profile);
            let features = structural_features(&draft.text, profile);
            let metadata = ChunkMetadata {
                manual_id: profile.manual_id.clone(),
                level1_id: entry.level1_id().map(str::to_string),
                procedure_name: entry.title.clone(),
                hierarchical_header: compose_hierarchical_header(&profile.manual_title, &titles),
                hierarchy_path: entry.hierarchy_path.clone(),
                content_type: entry.content_type.clone(),
                level: entry.level,
                page_range,
                line_range: range,
                token_count: profile.sizes.count_tokens(&draft.text),
                vehicle_models: applicability.vehicle_models,
                engine_applicability: applicability.engines,
                drivetrain_applicability: applicability.drivetrains,
                has_safety_callouts: !features.safety_levels.is_empty(),
                safety_levels: features.safety_levels,
                figure_references: features.figure_references,
                cross_references: features.cross_references,
            };
            Chunk {
                chunk_id,
                manual_id: profile.manual_id.clone(),
                text: draft.text,
                metadata,
            }
        })
        .collect()
}
