use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub check: String,
    pub severity: Severity,
    pub chunk_id: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, Value>,
}

impl ValidationIssue {
    pub fn new(
        check: &str,
        severity: Severity,
        chunk_id: &str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            check: check.to_string(),
            severity,
            chunk_id: chunk_id.to_string(),
            message: message.into(),
            details: BTreeMap::new(),
        }
    }

    pub fn error(check: &str, chunk_id: &str, message: impl Into<String>) -> Self {
        Self::new(check, Severity::Error, chunk_id, message)
    }

    pub fn warning(check: &str, chunk_id: &str, message: impl Into<String>) -> Self {
        Self::new(check, Severity::Warning, chunk_id, message)
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}: {}",
            self.severity, self.check, self.chunk_id, self.message
        )
    }
}

/// Outcome of a full suite run. `passed` means no errors; warnings are
/// advisory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub total_chunks: usize,
    pub issues: Vec<ValidationIssue>,
    pub checks_run: Vec<String>,
    pub passed: bool,
    pub error_count: usize,
    pub warning_count: usize,
}

impl ValidationReport {
    pub fn new(total_chunks: usize, checks_run: Vec<String>, issues: Vec<ValidationIssue>) -> Self {
        let error_count = issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count();
        let warning_count = issues.len() - error_count;
        Self {
            total_chunks,
            issues,
            checks_run,
            passed: error_count == 0,
            error_count,
            warning_count,
        }
    }

    pub fn issues_for<'a>(&'a self, check: &'a str) -> impl Iterator<Item = &'a ValidationIssue> {
        self.issues.iter().filter(move |i| i.check == check)
    }
}
