//! Profile and document builders shared by unit tests.

use manual_core::DocumentLines;
use manual_profile::{CompiledProfile, HierarchyLevelConfig, KnownId, ManualProfile};

pub(crate) const BASE_PROFILE: &str = r#"
schema_version: "1.0"
manual_id: test-manual
manual_title: Test Manual
source_format: pdf-ocr
structure:
  hierarchy: []
  step_patterns:
    - '^\((\d{1,2})\)\s'
    - '^([a-z])\.\s'
  figure_reference:
    pattern: '\(Fig\.\s*(\d+)\)'
  cross_reference:
    patterns:
      - 'Refer to Group (\d{1,2}[A-Z]?)'
safety_callouts:
  - { level: warning, pattern: '^WARNING:' }
  - { level: caution, pattern: '^CAUTION:' }
  - { level: note, pattern: '^NOTE:' }
"#;

pub(crate) fn level(
    level: u32,
    name: &str,
    id_pattern: Option<&str>,
    title_pattern: Option<&str>,
) -> HierarchyLevelConfig {
    HierarchyLevelConfig {
        level,
        name: name.to_string(),
        id_pattern: id_pattern.map(str::to_string),
        title_pattern: title_pattern.map(str::to_string),
        alternate_patterns: vec![],
        known_ids: vec![],
        require_known_id: false,
        require_blank_before: false,
        min_gap_lines: 0,
        min_content_words: 0,
    }
}

pub(crate) fn known(ids: &[&str]) -> Vec<KnownId> {
    ids.iter()
        .map(|id| KnownId {
            id: id.to_string(),
            title: None,
        })
        .collect()
}

pub(crate) fn base_profile() -> ManualProfile {
    ManualProfile::from_yaml_str(BASE_PROFILE).unwrap()
}

pub(crate) fn compile(levels: Vec<HierarchyLevelConfig>) -> CompiledProfile {
    let mut profile = base_profile();
    profile.structure.hierarchy = levels;
    profile.compile().unwrap()
}

/// Group (`GROUP 7`), section (all-caps line) and procedure levels.
pub(crate) fn three_level_profile() -> CompiledProfile {
    compile(vec![
        level(1, "group", Some(r"^GROUP\s+(\d{1,2}[A-Z]?)\b"), None),
        level(2, "section", None, Some(r"^([A-Z]{3,}(?: [A-Z]{3,})*)$")),
        level(3, "procedure", None, Some(r"^([A-Z][a-z]+(?: [A-Za-z]+)*):$")),
    ])
}

pub(crate) fn xj() -> CompiledProfile {
    ManualProfile::from_yaml_str(include_str!("../../../data/profiles/xj-1999.yaml"))
        .unwrap()
        .compile()
        .unwrap()
}

pub(crate) fn doc(pages: &[&str]) -> DocumentLines {
    DocumentLines::from_pages(pages)
}

/// `n` filler words.
pub(crate) fn words(n: usize) -> String {
    (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
}
