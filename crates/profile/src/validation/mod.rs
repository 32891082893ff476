//! Profile validation with structured errors and suggestions.
//!
//! Checks the identity fields, the hierarchy (numbering, matchers, allow-lists),
//! every configured regex, callout settings and size thresholds.
//! Returns a [`ValidationResult`] with errors (block loading) and warnings
//! (advisory).

mod fuzzy;
mod pattern_checks;
mod structure_checks;

use serde::{Deserialize, Serialize};

use crate::schema::{ManualProfile, SCHEMA_VERSION, SOURCE_FORMATS};

// ── Result types ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

/// A blocking validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    /// Dotted location, e.g. `"structure.hierarchy[0].id_pattern"`.
    pub path: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationResult {
    pub(crate) fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(ValidationError {
            path: path.into(),
            message: message.into(),
            suggestion: None,
        });
    }

    pub(crate) fn error_with_suggestion(
        &mut self,
        path: impl Into<String>,
        message: impl Into<String>,
        suggestion: Option<&str>,
    ) {
        self.valid = false;
        self.errors.push(ValidationError {
            path: path.into(),
            message: message.into(),
            suggestion: suggestion.map(|s| format!("did you mean '{s}'?")),
        });
    }

    pub(crate) fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationWarning {
            path: path.into(),
            message: message.into(),
        });
    }

    /// `"path: message"` lines for every error.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .map(|e| match &e.suggestion {
                Some(s) => format!("{}: {} ({s})", e.path, e.message),
                None => format!("{}: {}", e.path, e.message),
            })
            .collect()
    }
}

// ── Public API ──────────────────────────────────────────────────────

/// Validate a parsed [`ManualProfile`].
pub fn validate_profile(profile: &ManualProfile) -> ValidationResult {
    let mut result = ValidationResult::new();
    validate_identity(profile, &mut result);
    structure_checks::validate_hierarchy(profile, &mut result);
    structure_checks::validate_skip_sections(profile, &mut result);
    structure_checks::validate_chunking(profile, &mut result);
    pattern_checks::validate_patterns(profile, &mut result);
    result
}

/// Parse raw YAML and validate. Parse failures become a single root error.
pub fn validate_yaml(yaml: &str) -> ValidationResult {
    match ManualProfile::from_yaml_str(yaml) {
        Ok(profile) => validate_profile(&profile),
        Err(e) => {
            let mut result = ValidationResult::new();
            result.error("", format!("YAML parse error: {e}"));
            result
        }
    }
}

fn validate_identity(profile: &ManualProfile, result: &mut ValidationResult) {
    if profile.schema_version != SCHEMA_VERSION {
        result.error(
            "schema_version",
            format!(
                "schema_version must be '{SCHEMA_VERSION}', got '{}'",
                profile.schema_version
            ),
        );
    }
    if profile.manual_id.trim().is_empty() {
        result.error("manual_id", "manual_id is required");
    } else if !fuzzy::is_manual_id(&profile.manual_id) {
        result.error(
            "manual_id",
            format!(
                "manual_id must be lowercase alphanumerics and hyphens, got '{}'",
                profile.manual_id
            ),
        );
    }
    if profile.manual_title.trim().is_empty() {
        result.error("manual_title", "manual_title is required");
    }
    if !SOURCE_FORMATS.contains(&profile.source_format.as_str()) {
        result.error_with_suggestion(
            "source_format",
            format!(
                "unknown source_format '{}', expected one of {}",
                profile.source_format,
                SOURCE_FORMATS.join(", ")
            ),
            fuzzy::suggest(&profile.source_format, SOURCE_FORMATS),
        );
    }
}

#[cfg(test)]
mod tests;
