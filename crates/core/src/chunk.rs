//! Final retrieval chunks and their metadata.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::manifest::{LineRange, PageRange};

/// Applicability tag meaning "no specific mention found".
pub const APPLIES_TO_ALL: &str = "all";

/// Severity of a safety callout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalloutLevel {
    Warning,
    Caution,
    Note,
}

impl CalloutLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalloutLevel::Warning => "warning",
            CalloutLevel::Caution => "caution",
            CalloutLevel::Note => "note",
        }
    }
}

impl fmt::Display for CalloutLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub chunk_id: String,
    pub manual_id: String,
    pub text: String,
    pub metadata: ChunkMetadata,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub manual_id: String,
    pub level1_id: Option<String>,
    pub procedure_name: String,
    /// `"{manual_title} | {ancestor titles…}"`, used to prefix embedding input.
    pub hierarchical_header: String,
    pub hierarchy_path: Vec<String>,
    pub content_type: String,
    pub level: u32,
    pub page_range: PageRange,
    pub line_range: LineRange,
    pub token_count: usize,

    pub vehicle_models: Vec<String>,
    pub engine_applicability: Vec<String>,
    pub drivetrain_applicability: Vec<String>,

    pub has_safety_callouts: bool,
    pub safety_levels: Vec<CalloutLevel>,
    pub figure_references: Vec<String>,
    /// Cross-reference targets qualified with the manual namespace.
    pub cross_references: Vec<String>,
}

impl Chunk {
    pub fn level1_id(&self) -> Option<&str> {
        self.metadata.level1_id.as_deref()
    }
}
