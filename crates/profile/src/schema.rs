//! YAML-level profile types.
//!
//! A profile describes one document family: how its hierarchy is spelled,
//! which ids are real, what steps/callouts/figures/cross-references look like,
//! which vehicles it covers, and how large chunks may grow.

use serde::{Deserialize, Serialize};

use manual_core::CalloutLevel;

/// Only schema version currently understood.
pub const SCHEMA_VERSION: &str = "1.0";

/// Accepted `source_format` values.
pub const SOURCE_FORMATS: &[&str] = &["pdf-ocr", "pdf-native", "html", "epub"];

// ── Top level ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ManualProfile {
    pub schema_version: String,
    pub manual_id: String,
    pub manual_title: String,
    #[serde(default)]
    pub source_url: Option<String>,
    pub source_format: String,
    #[serde(default)]
    pub vehicles: Vec<VehicleConfig>,
    pub structure: StructureConfig,
    #[serde(default)]
    pub safety_callouts: Vec<SafetyCalloutConfig>,
    /// Level-1 ids whose whole subtree produces no chunks.
    #[serde(default)]
    pub skip_sections: Vec<String>,
    #[serde(default)]
    pub chunking: ChunkingConfig,
}

// ── Vehicles ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct VehicleConfig {
    pub model: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub years: Option<String>,
    #[serde(default)]
    pub drive_type: Vec<String>,
    #[serde(default)]
    pub engines: Vec<EngineConfig>,
    #[serde(default)]
    pub transmissions: Vec<TransmissionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TransmissionConfig {
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
}

// ── Structure ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct StructureConfig {
    /// Ordered shallowest first; levels are numbered 1..n.
    pub hierarchy: Vec<HierarchyLevelConfig>,
    #[serde(default)]
    pub step_patterns: Vec<String>,
    #[serde(default)]
    pub figure_reference: Option<FigureReferenceConfig>,
    #[serde(default)]
    pub cross_reference: Option<CrossReferenceConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct HierarchyLevelConfig {
    pub level: u32,
    pub name: String,
    /// Capture group 1 (or the whole match) is the boundary id.
    #[serde(default)]
    pub id_pattern: Option<String>,
    /// Capture group 1 (or the whole match) is the boundary title.
    #[serde(default)]
    pub title_pattern: Option<String>,
    /// Extra matchers tried after the primary pair, in declaration order.
    #[serde(default)]
    pub alternate_patterns: Vec<PatternPair>,
    #[serde(default)]
    pub known_ids: Vec<KnownId>,
    #[serde(default)]
    pub require_known_id: bool,
    #[serde(default)]
    pub require_blank_before: bool,
    #[serde(default)]
    pub min_gap_lines: usize,
    #[serde(default)]
    pub min_content_words: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PatternPair {
    #[serde(default)]
    pub id_pattern: Option<String>,
    #[serde(default)]
    pub title_pattern: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct KnownId {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FigureReferenceConfig {
    pub pattern: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CrossReferenceConfig {
    pub patterns: Vec<String>,
}

impl HierarchyLevelConfig {
    /// Primary matcher followed by alternates.
    pub fn matchers(&self) -> Vec<PatternPair> {
        let mut pairs = Vec::with_capacity(1 + self.alternate_patterns.len());
        if self.id_pattern.is_some() || self.title_pattern.is_some() {
            pairs.push(PatternPair {
                id_pattern: self.id_pattern.clone(),
                title_pattern: self.title_pattern.clone(),
            });
        }
        pairs.extend(self.alternate_patterns.iter().cloned());
        pairs
    }
}

// ── Safety callouts ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SafetyCalloutConfig {
    pub level: CalloutLevel,
    /// Patterns not anchored with `^` match case-insensitively.
    pub pattern: String,
    #[serde(default)]
    pub style: CalloutStyle,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CalloutStyle {
    /// Extends over continuation lines until a blank line.
    #[default]
    Block,
    /// Occupies only the matching line.
    Inline,
}

// ── Chunking ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ChunkingConfig {
    pub min_tokens: usize,
    pub target_min_tokens: usize,
    pub target_max_tokens: usize,
    pub max_tokens: usize,
    /// Ceiling for cross-entry merges; defaults to `max_tokens`.
    pub max_merge_tokens: Option<usize>,
    pub token_estimate_factor: f64,
    pub empty_document: EmptyDocumentPolicy,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            min_tokens: 200,
            target_min_tokens: 500,
            target_max_tokens: 1500,
            max_tokens: 2000,
            max_merge_tokens: None,
            token_estimate_factor: 1.0,
            empty_document: EmptyDocumentPolicy::default(),
        }
    }
}

/// What to emit for a document in which no boundary survives filtering.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EmptyDocumentPolicy {
    #[default]
    NoChunks,
    /// One chunk covering the whole document, id = `manual_id`.
    WholeDocument,
}

impl ManualProfile {
    pub fn from_yaml_str(yaml: &str) -> serde_yaml::Result<Self> {
        serde_yaml::from_str(yaml)
    }
}
