//! Immutable, pattern-compiled form of a [`ManualProfile`].

use std::collections::BTreeSet;

use regex::{Regex, RegexBuilder};

use manual_core::{format_chunk_id, CalloutLevel};

use crate::error::{ProfileError, Result};
use crate::schema::*;

/// Built-in spellings for common drivetrain tags.
const DRIVE_SYNONYMS: &[(&str, &[&str])] = &[
    ("4WD", &["4x4", "four-wheel drive", "four wheel drive"]),
    ("2WD", &["4x2", "two-wheel drive", "two wheel drive"]),
    ("AWD", &["all-wheel drive", "all wheel drive"]),
];

// ── Compiled types ──────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct CompiledProfile {
    pub manual_id: String,
    pub manual_title: String,
    /// Ordered shallowest first.
    pub levels: Vec<CompiledLevel>,
    pub step_patterns: Vec<Regex>,
    pub safety_callouts: Vec<CompiledCallout>,
    pub figure_reference: Option<Regex>,
    pub cross_references: Vec<Regex>,
    pub skip_sections: BTreeSet<String>,
    pub sizes: ChunkSizes,
    pub applicability: ApplicabilityTables,
}

#[derive(Debug, Clone)]
pub struct CompiledLevel {
    pub level: u32,
    pub name: String,
    pub matchers: Vec<LevelMatcher>,
    pub known_ids: BTreeSet<String>,
    pub filters: LevelFilters,
}

#[derive(Debug, Clone)]
pub struct LevelMatcher {
    pub id: Option<Regex>,
    pub title: Option<Regex>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelFilters {
    pub require_known_id: bool,
    pub require_blank_before: bool,
    pub min_gap_lines: usize,
    pub min_content_words: usize,
}

#[derive(Debug, Clone)]
pub struct CompiledCallout {
    pub level: CalloutLevel,
    pub style: CalloutStyle,
    pub pattern: Regex,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkSizes {
    pub min_tokens: usize,
    pub target_min_tokens: usize,
    pub target_max_tokens: usize,
    pub max_tokens: usize,
    pub max_merge_tokens: usize,
    pub token_estimate_factor: f64,
    pub empty_document: EmptyDocumentPolicy,
}

impl ChunkSizes {
    /// Estimated tokens: whitespace words scaled by the profile factor.
    pub fn count_tokens(&self, text: &str) -> usize {
        self.tokens_for_words(manual_core::count_words(text))
    }

    pub fn tokens_for_words(&self, words: usize) -> usize {
        (words as f64 * self.token_estimate_factor).round() as usize
    }

    pub fn within_target(&self, tokens: usize) -> bool {
        (self.target_min_tokens..=self.target_max_tokens).contains(&tokens)
    }
}

impl From<&ChunkingConfig> for ChunkSizes {
    fn from(c: &ChunkingConfig) -> Self {
        Self {
            min_tokens: c.min_tokens,
            target_min_tokens: c.target_min_tokens,
            target_max_tokens: c.target_max_tokens,
            max_tokens: c.max_tokens,
            max_merge_tokens: c.max_merge_tokens.unwrap_or(c.max_tokens),
            token_estimate_factor: c.token_estimate_factor,
            empty_document: c.empty_document,
        }
    }
}

/// A named tag and the case-insensitive whole-word pattern that finds it.
#[derive(Debug, Clone)]
pub struct AliasMatcher {
    pub tag: String,
    pattern: Regex,
}

impl AliasMatcher {
    pub fn new<S: AsRef<str>>(tag: &str, names: &[S]) -> Result<Self> {
        let alternatives: Vec<String> = names
            .iter()
            .map(|n| n.as_ref().trim())
            .filter(|n| !n.is_empty())
            .map(regex::escape)
            .collect();
        let source = format!(r"(?:^|\W)(?:{})(?:\W|$)", alternatives.join("|"));
        let pattern = RegexBuilder::new(&source)
            .case_insensitive(true)
            .build()
            .map_err(|source| ProfileError::Pattern {
                field: format!("alias table for '{tag}'"),
                source,
            })?;
        Ok(Self {
            tag: tag.to_string(),
            pattern,
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ApplicabilityTables {
    pub vehicles: Vec<AliasMatcher>,
    pub engines: Vec<AliasMatcher>,
    pub drivetrains: Vec<AliasMatcher>,
}

// ── Compilation ─────────────────────────────────────────────────────

fn compile_pattern(field: impl Into<String>, source: &str) -> Result<Regex> {
    Regex::new(source).map_err(|e| ProfileError::Pattern {
        field: field.into(),
        source: e,
    })
}

fn compile_optional(field: String, source: Option<&str>) -> Result<Option<Regex>> {
    source.map(|s| compile_pattern(field, s)).transpose()
}

/// Callout patterns without a leading `^` are matched case-insensitively.
pub(crate) fn compile_callout_pattern(field: impl Into<String>, source: &str) -> Result<Regex> {
    RegexBuilder::new(source)
        .case_insensitive(!source.starts_with('^'))
        .build()
        .map_err(|e| ProfileError::Pattern {
            field: field.into(),
            source: e,
        })
}

fn compile_level(index: usize, cfg: &HierarchyLevelConfig) -> Result<CompiledLevel> {
    let has_primary = cfg.id_pattern.is_some() || cfg.title_pattern.is_some();
    let matchers = cfg
        .matchers()
        .iter()
        .enumerate()
        .map(|(m, pair)| {
            let base = match (has_primary, m) {
                (true, 0) => format!("structure.hierarchy[{index}]"),
                (true, m) => format!("structure.hierarchy[{index}].alternate_patterns[{}]", m - 1),
                (false, m) => format!("structure.hierarchy[{index}].alternate_patterns[{m}]"),
            };
            Ok(LevelMatcher {
                id: compile_optional(format!("{base}.id_pattern"), pair.id_pattern.as_deref())?,
                title: compile_optional(
                    format!("{base}.title_pattern"),
                    pair.title_pattern.as_deref(),
                )?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CompiledLevel {
        level: cfg.level,
        name: cfg.name.clone(),
        matchers,
        known_ids: cfg.known_ids.iter().map(|k| k.id.clone()).collect(),
        filters: LevelFilters {
            require_known_id: cfg.require_known_id,
            require_blank_before: cfg.require_blank_before,
            min_gap_lines: cfg.min_gap_lines,
            min_content_words: cfg.min_content_words,
        },
    })
}

fn build_applicability(vehicles: &[VehicleConfig]) -> Result<ApplicabilityTables> {
    let mut tables = ApplicabilityTables::default();
    let mut drive_types: Vec<&str> = Vec::new();

    for vehicle in vehicles {
        let mut names = vec![vehicle.model.as_str()];
        names.extend(vehicle.aliases.iter().map(String::as_str));
        tables.vehicles.push(AliasMatcher::new(&vehicle.model, &names)?);

        for engine in &vehicle.engines {
            if tables.engines.iter().any(|m| m.tag == engine.name) {
                continue;
            }
            let mut names = vec![engine.name.as_str()];
            names.extend(engine.code.as_deref());
            names.extend(engine.aliases.iter().map(String::as_str));
            tables.engines.push(AliasMatcher::new(&engine.name, &names)?);
        }

        for dt in &vehicle.drive_type {
            if !drive_types.contains(&dt.as_str()) {
                drive_types.push(dt);
            }
        }
    }

    for dt in drive_types {
        let mut names = vec![dt];
        if let Some((_, synonyms)) = DRIVE_SYNONYMS
            .iter()
            .find(|(tag, _)| tag.eq_ignore_ascii_case(dt))
        {
            names.extend(synonyms.iter().copied());
        }
        tables.drivetrains.push(AliasMatcher::new(dt, &names)?);
    }

    Ok(tables)
}

impl ManualProfile {
    /// Compile every pattern and alias table once.
    pub fn compile(&self) -> Result<CompiledProfile> {
        let mut levels = self
            .structure
            .hierarchy
            .iter()
            .enumerate()
            .map(|(i, cfg)| compile_level(i, cfg))
            .collect::<Result<Vec<_>>>()?;
        levels.sort_by_key(|l| l.level);

        let step_patterns = self
            .structure
            .step_patterns
            .iter()
            .enumerate()
            .map(|(i, p)| compile_pattern(format!("structure.step_patterns[{i}]"), p))
            .collect::<Result<Vec<_>>>()?;

        let safety_callouts = self
            .safety_callouts
            .iter()
            .enumerate()
            .map(|(i, c)| {
                Ok(CompiledCallout {
                    level: c.level,
                    style: c.style,
                    pattern: compile_callout_pattern(
                        format!("safety_callouts[{i}].pattern"),
                        &c.pattern,
                    )?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let figure_reference = self
            .structure
            .figure_reference
            .as_ref()
            .map(|f| compile_pattern("structure.figure_reference.pattern", &f.pattern))
            .transpose()?;

        let cross_references = self
            .structure
            .cross_reference
            .iter()
            .flat_map(|c| c.patterns.iter())
            .enumerate()
            .map(|(i, p)| compile_pattern(format!("structure.cross_reference.patterns[{i}]"), p))
            .collect::<Result<Vec<_>>>()?;

        Ok(CompiledProfile {
            manual_id: self.manual_id.clone(),
            manual_title: self.manual_title.clone(),
            levels,
            step_patterns,
            safety_callouts,
            figure_reference,
            cross_references,
            skip_sections: self.skip_sections.iter().cloned().collect(),
            sizes: ChunkSizes::from(&self.chunking),
            applicability: build_applicability(&self.vehicles)?,
        })
    }
}

impl CompiledProfile {
    pub fn level(&self, level: u32) -> Option<&CompiledLevel> {
        self.levels.iter().find(|l| l.level == level)
    }

    /// Allow-list of the top-level group, if one is configured.
    pub fn level1_known_ids(&self) -> Option<&BTreeSet<String>> {
        self.levels
            .first()
            .map(|l| &l.known_ids)
            .filter(|ids| !ids.is_empty())
    }

    pub fn is_skipped(&self, level1_id: &str) -> bool {
        self.skip_sections.contains(level1_id)
    }

    /// Qualify a cross-reference target with this manual's namespace.
    pub fn qualify(&self, target: &str) -> String {
        format_chunk_id(&self.manual_id, &[target.trim()])
    }
}
