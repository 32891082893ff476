//! Hierarchy, skip-section and size-threshold checks.

use std::collections::HashSet;

use manual_core::{NAMESPACE_SEPARATOR, PART_SEPARATOR};

use super::fuzzy::suggest;
use super::ValidationResult;
use crate::schema::ManualProfile;

pub fn validate_hierarchy(profile: &ManualProfile, result: &mut ValidationResult) {
    let hierarchy = &profile.structure.hierarchy;
    if hierarchy.is_empty() {
        result.error("structure.hierarchy", "at least one hierarchy level is required");
        return;
    }

    for (i, level) in hierarchy.iter().enumerate() {
        let path = format!("structure.hierarchy[{i}]");
        let expected = i as u32 + 1;
        if level.level != expected {
            result.error(
                format!("{path}.level"),
                format!(
                    "levels must be numbered sequentially from 1, expected {expected}, got {}",
                    level.level
                ),
            );
        }
        if level.name.trim().is_empty() {
            result.error(format!("{path}.name"), "level name is required");
        }

        if level.id_pattern.is_none() && level.title_pattern.is_none() && level.alternate_patterns.is_empty() {
            result.error(
                path.clone(),
                format!("hierarchy level {} declares no id_pattern or title_pattern", level.level),
            );
        }
        for (a, alt) in level.alternate_patterns.iter().enumerate() {
            if alt.id_pattern.is_none() && alt.title_pattern.is_none() {
                result.error(
                    format!("{path}.alternate_patterns[{a}]"),
                    "alternate matcher declares no pattern",
                );
            }
        }

        if level.require_known_id && level.known_ids.is_empty() {
            result.warn(
                format!("{path}.known_ids"),
                "require_known_id is set but known_ids is empty; every id will pass",
            );
        }

        let mut seen = HashSet::new();
        for (k, known) in level.known_ids.iter().enumerate() {
            if !seen.insert(known.id.as_str()) {
                result.warn(
                    format!("{path}.known_ids[{k}]"),
                    format!("duplicate known id '{}'", known.id),
                );
            }
            if known.id.contains(NAMESPACE_SEPARATOR) || known.id.contains(PART_SEPARATOR) {
                result.error(
                    format!("{path}.known_ids[{k}]"),
                    format!(
                        "known id '{}' contains a reserved separator ('{NAMESPACE_SEPARATOR}' or '{PART_SEPARATOR}')",
                        known.id
                    ),
                );
            }
        }
    }

    if profile.structure.step_patterns.is_empty() {
        result.warn(
            "structure.step_patterns",
            "no step patterns configured; step sequences will not be protected",
        );
    }
}

pub fn validate_skip_sections(profile: &ManualProfile, result: &mut ValidationResult) {
    let Some(first) = profile.structure.hierarchy.first() else {
        return;
    };
    if first.known_ids.is_empty() {
        return;
    }
    let known: Vec<&str> = first.known_ids.iter().map(|k| k.id.as_str()).collect();
    for (i, id) in profile.skip_sections.iter().enumerate() {
        if !known.contains(&id.as_str()) {
            let hint = suggest(id, &known)
                .map(|s| format!(" (did you mean '{s}'?)"))
                .unwrap_or_default();
            result.warn(
                format!("skip_sections[{i}]"),
                format!("'{id}' is not a known level-1 id{hint}"),
            );
        }
    }
}

pub fn validate_chunking(profile: &ManualProfile, result: &mut ValidationResult) {
    let c = &profile.chunking;
    if !(c.min_tokens <= c.target_min_tokens
        && c.target_min_tokens <= c.target_max_tokens
        && c.target_max_tokens <= c.max_tokens)
    {
        result.error(
            "chunking",
            format!(
                "size thresholds must satisfy min <= target_min <= target_max <= max, got {} / {} / {} / {}",
                c.min_tokens, c.target_min_tokens, c.target_max_tokens, c.max_tokens
            ),
        );
    }
    if c.max_tokens == 0 {
        result.error("chunking.max_tokens", "max_tokens must be positive");
    }
    if !(c.token_estimate_factor > 0.0) {
        result.error(
            "chunking.token_estimate_factor",
            format!("token_estimate_factor must be positive, got {}", c.token_estimate_factor),
        );
    }
    if let Some(max_merge) = c.max_merge_tokens {
        if max_merge < c.min_tokens {
            result.warn(
                "chunking.max_merge_tokens",
                format!(
                    "max_merge_tokens ({max_merge}) is below min_tokens ({}); small chunks can never merge",
                    c.min_tokens
                ),
            );
        }
    }
}
