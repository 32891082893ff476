//! Tests for profile validation.

use super::*;

fn xj() -> ManualProfile {
    ManualProfile::from_yaml_str(include_str!("../../../../data/profiles/xj-1999.yaml")).unwrap()
}

fn has_error(result: &ValidationResult, path: &str) -> bool {
    result.errors.iter().any(|e| e.path == path)
}

// ── Fixtures ────────────────────────────────────────────────────────

#[test]
fn fixture_profiles_are_valid() {
    for yaml in [
        include_str!("../../../../data/profiles/xj-1999.yaml"),
        include_str!("../../../../data/profiles/tm9-8014.yaml"),
        include_str!("../../../../data/profiles/cj-universal.yaml"),
    ] {
        let result = validate_yaml(yaml);
        assert!(result.valid, "unexpected errors: {:?}", result.error_messages());
    }
}

#[test]
fn yaml_parse_error_reported_at_root() {
    let result = validate_yaml("manual_id: [unterminated");
    assert!(!result.valid);
    assert_eq!(result.errors[0].path, "");
    assert!(result.errors[0].message.starts_with("YAML parse error"));
}

// ── Identity ────────────────────────────────────────────────────────

#[test]
fn wrong_schema_version() {
    let mut profile = xj();
    profile.schema_version = "2.0".into();
    assert!(has_error(&validate_profile(&profile), "schema_version"));
}

#[test]
fn manual_id_required_and_shaped() {
    let mut profile = xj();
    profile.manual_id = String::new();
    assert!(has_error(&validate_profile(&profile), "manual_id"));
    profile.manual_id = "XJ 1999".into();
    assert!(has_error(&validate_profile(&profile), "manual_id"));
}

#[test]
fn source_format_suggestion() {
    let mut profile = xj();
    profile.source_format = "pdf_ocr".into();
    let result = validate_profile(&profile);
    let err = result.errors.iter().find(|e| e.path == "source_format").unwrap();
    assert_eq!(err.suggestion.as_deref(), Some("did you mean 'pdf-ocr'?"));
}

// ── Hierarchy ───────────────────────────────────────────────────────

#[test]
fn empty_hierarchy_rejected() {
    let mut profile = xj();
    profile.structure.hierarchy.clear();
    assert!(has_error(&validate_profile(&profile), "structure.hierarchy"));
}

#[test]
fn non_sequential_levels_rejected() {
    let mut profile = xj();
    profile.structure.hierarchy[2].level = 4;
    assert!(has_error(&validate_profile(&profile), "structure.hierarchy[2].level"));
}

#[test]
fn level_without_patterns_rejected() {
    let mut profile = xj();
    profile.structure.hierarchy[1].title_pattern = None;
    let result = validate_profile(&profile);
    assert!(has_error(&result, "structure.hierarchy[1]"));
}

#[test]
fn require_known_id_without_list_warns() {
    let mut profile = xj();
    profile.structure.hierarchy[0].known_ids.clear();
    let result = validate_profile(&profile);
    assert!(result.valid);
    assert!(result
        .warnings
        .iter()
        .any(|w| w.path == "structure.hierarchy[0].known_ids"));
}

#[test]
fn reserved_separator_in_known_id_rejected() {
    let mut profile = xj();
    profile.structure.hierarchy[0].known_ids[0].id = "0::A".into();
    assert!(has_error(&validate_profile(&profile), "structure.hierarchy[0].known_ids[0]"));
}

#[test]
fn unknown_skip_section_warns_with_hint() {
    let mut profile = xj();
    profile.skip_sections = vec!["8X".into()];
    let result = validate_profile(&profile);
    let warning = result
        .warnings
        .iter()
        .find(|w| w.path == "skip_sections[0]")
        .unwrap();
    assert!(warning.message.contains("did you mean"), "{}", warning.message);
}

// ── Patterns ────────────────────────────────────────────────────────

#[test]
fn invalid_id_pattern_names_level() {
    let mut profile = xj();
    profile.structure.hierarchy[0].id_pattern = Some("([unclosed".into());
    let result = validate_profile(&profile);
    let err = result
        .errors
        .iter()
        .find(|e| e.path == "structure.hierarchy[0].id_pattern")
        .unwrap();
    assert!(err.message.contains("id_pattern at hierarchy level 1"), "{}", err.message);
}

#[test]
fn invalid_step_pattern_names_index() {
    let mut profile = xj();
    profile.structure.step_patterns[0] = "(oops".into();
    let result = validate_profile(&profile);
    assert!(result.errors.iter().any(|e| e.message.contains("step_patterns[0]")));
}

#[test]
fn invalid_callout_pattern_rejected() {
    let mut profile = xj();
    profile.safety_callouts[0].pattern = "[WARNING".into();
    let result = validate_profile(&profile);
    let err = result
        .errors
        .iter()
        .find(|e| e.path == "safety_callouts[0].pattern")
        .unwrap();
    assert!(err.message.contains("safety callout pattern"));
}

// ── Chunking ────────────────────────────────────────────────────────

#[test]
fn unordered_thresholds_rejected() {
    let mut profile = xj();
    profile.chunking.min_tokens = 3000;
    assert!(has_error(&validate_profile(&profile), "chunking"));
}

#[test]
fn non_positive_factor_rejected() {
    let mut profile = xj();
    profile.chunking.token_estimate_factor = 0.0;
    assert!(has_error(&validate_profile(&profile), "chunking.token_estimate_factor"));
}

#[test]
fn tiny_merge_ceiling_warns() {
    let mut profile = xj();
    profile.chunking.max_merge_tokens = Some(10);
    let result = validate_profile(&profile);
    assert!(result.valid);
    assert!(result.warnings.iter().any(|w| w.path == "chunking.max_merge_tokens"));
}
