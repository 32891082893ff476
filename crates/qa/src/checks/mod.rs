//! The seven chunk checks, run in [`CHECKS`] order.

use std::collections::HashMap;

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use manual_core::{CalloutLevel, Chunk, ChunkId};
use manual_ingest::chunker::{detect_safety_callouts, FIRST_ORDINALS, WHOLE_DOCUMENT_LEVEL};
use manual_profile::CompiledProfile;

use crate::report::{Severity, ValidationIssue, ValidationReport};

pub type CheckFn = fn(&[Chunk], &CompiledProfile) -> Vec<ValidationIssue>;

pub const CHECKS: [(&str, CheckFn); 7] = [
    ("orphaned_steps", check_orphaned_steps),
    ("split_safety_callouts", check_split_safety_callouts),
    ("size_outliers", check_size_outliers),
    ("metadata_completeness", check_metadata_completeness),
    ("duplicate_content", check_duplicate_content),
    ("cross_ref_validity", check_cross_ref_validity),
    ("profile_validation", check_profile_validation),
];

/// Run every check and collect the report.
pub fn run_validation_suite(chunks: &[Chunk], profile: &CompiledProfile) -> ValidationReport {
    let mut issues = Vec::new();
    let mut checks_run = Vec::with_capacity(CHECKS.len());
    for (name, check) in CHECKS {
        let found = check(chunks, profile);
        debug!(check = name, issues = found.len(), "ran check");
        issues.extend(found);
        checks_run.push(name.to_string());
    }
    let report = ValidationReport::new(chunks.len(), checks_run, issues);
    info!(
        manual_id = %profile.manual_id,
        chunks = report.total_chunks,
        errors = report.error_count,
        warnings = report.warning_count,
        passed = report.passed,
        "validation suite complete"
    );
    report
}

fn first_content_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).find(|l| !l.is_empty())
}

// ── Structure ───────────────────────────────────────────────────────

/// A chunk that opens on a step other than a first one.
pub fn check_orphaned_steps(chunks: &[Chunk], profile: &CompiledProfile) -> Vec<ValidationIssue> {
    chunks
        .iter()
        .filter_map(|chunk| {
            let first = first_content_line(&chunk.text)?;
            let ordinal = profile.step_patterns.iter().find_map(|re| {
                re.captures(first)
                    .and_then(|caps| caps.get(1))
                    .map(|m| m.as_str().to_string())
            })?;
            if FIRST_ORDINALS.contains(&ordinal.as_str()) {
                return None;
            }
            Some(
                ValidationIssue::warning(
                    "orphaned_steps",
                    &chunk.chunk_id,
                    format!("chunk starts mid-sequence at step '{ordinal}'"),
                )
                .with_detail("ordinal", ordinal),
            )
        })
        .collect()
}

/// A chunk holding nothing but safety callouts has lost its procedure.
pub fn check_split_safety_callouts(
    chunks: &[Chunk],
    profile: &CompiledProfile,
) -> Vec<ValidationIssue> {
    chunks
        .iter()
        .filter_map(|chunk| {
            let lines: Vec<String> = chunk.text.lines().map(str::to_string).collect();
            let callouts =
                detect_safety_callouts(&lines, &profile.safety_callouts, &profile.step_patterns);
            if callouts.is_empty() {
                return None;
            }
            let covered = |i: usize| callouts.iter().any(|c| c.line_range.contains_line(i));
            let only_callouts = lines
                .iter()
                .enumerate()
                .all(|(i, l)| l.trim().is_empty() || covered(i));
            if !only_callouts {
                return None;
            }
            let levels: Vec<CalloutLevel> = callouts.iter().map(|c| c.level).collect();
            let severity = if levels.iter().all(|l| *l == CalloutLevel::Note) {
                Severity::Warning
            } else {
                Severity::Error
            };
            let names: Vec<&str> = levels.iter().map(CalloutLevel::as_str).collect();
            Some(
                ValidationIssue::new(
                    "split_safety_callouts",
                    severity,
                    &chunk.chunk_id,
                    "chunk contains only a safety callout, separated from its procedure",
                )
                .with_detail("levels", names),
            )
        })
        .collect()
}

// ── Size and metadata ───────────────────────────────────────────────

/// Below half the minimum or above one and a half times the ceiling.
pub fn check_size_outliers(chunks: &[Chunk], profile: &CompiledProfile) -> Vec<ValidationIssue> {
    let sizes = &profile.sizes;
    let low = sizes.min_tokens as f64 / 2.0;
    let high = sizes.max_tokens as f64 * 1.5;
    chunks
        .iter()
        .filter_map(|chunk| {
            let tokens = chunk.metadata.token_count;
            let message = if (tokens as f64) < low {
                format!("{tokens} tokens is below {low}")
            } else if tokens as f64 > high {
                format!("{tokens} tokens is above {high}")
            } else {
                return None;
            };
            Some(
                ValidationIssue::warning("size_outliers", &chunk.chunk_id, message)
                    .with_detail("token_count", tokens),
            )
        })
        .collect()
}

/// A whole-document chunk has no top-level group and is exempt from the
/// `level1_id` requirement.
pub fn check_metadata_completeness(
    chunks: &[Chunk],
    _profile: &CompiledProfile,
) -> Vec<ValidationIssue> {
    chunks
        .iter()
        .filter_map(|chunk| {
            let meta = &chunk.metadata;
            let missing: Vec<&str> = [
                ("manual_id", meta.manual_id.trim().is_empty()),
                (
                    "level1_id",
                    meta.content_type != WHOLE_DOCUMENT_LEVEL
                        && meta.level1_id.as_deref().map_or(true, |id| id.trim().is_empty()),
                ),
                ("content_type", meta.content_type.trim().is_empty()),
            ]
            .into_iter()
            .filter_map(|(field, empty)| empty.then_some(field))
            .collect();
            if missing.is_empty() {
                return None;
            }
            Some(
                ValidationIssue::error(
                    "metadata_completeness",
                    &chunk.chunk_id,
                    format!("missing {}", missing.join(", ")),
                )
                .with_detail("missing", missing),
            )
        })
        .collect()
}

/// Lowercased text with whitespace runs collapsed.
fn normalized_digest(text: &str) -> String {
    let normalized = text
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ");
    let digest = Sha256::digest(normalized.as_bytes());
    format!("{digest:x}")
}

pub fn check_duplicate_content(
    chunks: &[Chunk],
    _profile: &CompiledProfile,
) -> Vec<ValidationIssue> {
    let mut first_seen: HashMap<String, &str> = HashMap::new();
    let mut issues = Vec::new();
    for chunk in chunks {
        let digest = normalized_digest(&chunk.text);
        match first_seen.get(&digest) {
            Some(original) => issues.push(
                ValidationIssue::warning(
                    "duplicate_content",
                    &chunk.chunk_id,
                    format!("same text as {original}"),
                )
                .with_detail("duplicate_of", *original),
            ),
            None => {
                first_seen.insert(digest, &chunk.chunk_id);
            }
        }
    }
    issues
}

// ── References ──────────────────────────────────────────────────────

/// Exact id, a path prefix of some chunk, or the trailing segments of one.
fn resolves(target: &ChunkId, paths: &[ChunkId]) -> bool {
    let wanted = &target.hierarchy_path;
    !wanted.is_empty()
        && paths.iter().any(|p| {
            p.manual_id == target.manual_id
                && (p.hierarchy_path.starts_with(wanted) || p.hierarchy_path.ends_with(wanted))
        })
}

pub fn check_cross_ref_validity(
    chunks: &[Chunk],
    profile: &CompiledProfile,
) -> Vec<ValidationIssue> {
    let paths: Vec<ChunkId> = chunks.iter().map(|c| ChunkId::parse(&c.chunk_id)).collect();
    let mut issues = Vec::new();
    for chunk in chunks {
        for reference in &chunk.metadata.cross_references {
            let target = ChunkId::parse(reference);
            if resolves(&target, &paths) {
                continue;
            }
            let skipped = target
                .hierarchy_path
                .first()
                .is_some_and(|group| profile.is_skipped(group));
            let issue = if skipped {
                ValidationIssue::warning(
                    "cross_ref_validity",
                    &chunk.chunk_id,
                    format!("reference to {reference} points at a skipped section"),
                )
                .with_detail("skipped", true)
            } else {
                ValidationIssue::error(
                    "cross_ref_validity",
                    &chunk.chunk_id,
                    format!("reference to {reference} does not resolve to any chunk"),
                )
            };
            issues.push(issue.with_detail("target", reference.as_str()));
        }
    }
    issues
}

/// Top-level ids outside the profile's level-1 allow-list.
pub fn check_profile_validation(
    chunks: &[Chunk],
    profile: &CompiledProfile,
) -> Vec<ValidationIssue> {
    let Some(known) = profile.level1_known_ids() else {
        return Vec::new();
    };
    chunks
        .iter()
        .filter_map(|chunk| {
            let id = chunk.level1_id()?;
            if known.contains(id) {
                return None;
            }
            Some(
                ValidationIssue::error(
                    "profile_validation",
                    &chunk.chunk_id,
                    format!("level-1 id '{id}' is not in the profile's known ids"),
                )
                .with_detail("level1_id", id),
            )
        })
        .collect()
}
