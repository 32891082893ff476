//! Detect → filter → manifest → assemble over one document.

use tracing::{info, warn};

use manual_core::{Boundary, Chunk, DocumentLines, Manifest, Result};
use manual_profile::CompiledProfile;

use crate::chunker::assemble_chunks;
use crate::structure::{build_manifest, detect_boundaries, filter_boundaries, validate_boundaries};

/// Structural parse of one document.
#[derive(Debug, Clone)]
pub struct StructureOutput {
    /// Boundaries before filtering.
    pub detected: usize,
    pub boundaries: Vec<Boundary>,
    pub manifest: Manifest,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub structure: StructureOutput,
    pub chunks: Vec<Chunk>,
}

/// Detect, filter and build the manifest.
pub fn parse_structure(doc: &DocumentLines, profile: &CompiledProfile) -> StructureOutput {
    let detected = detect_boundaries(doc, profile);
    let detected_count = detected.len();
    let boundaries = filter_boundaries(detected, profile, doc);
    let warnings = validate_boundaries(&boundaries, profile);
    for warning in &warnings {
        warn!(manual_id = %profile.manual_id, "{warning}");
    }
    let manifest = build_manifest(&boundaries, profile, doc);
    info!(
        manual_id = %profile.manual_id,
        detected = detected_count,
        kept = boundaries.len(),
        entries = manifest.entries.len(),
        "parsed structure"
    );
    StructureOutput {
        detected: detected_count,
        boundaries,
        manifest,
        warnings,
    }
}

/// The full engine: structure then chunks.
pub fn run_pipeline(doc: &DocumentLines, profile: &CompiledProfile) -> Result<PipelineOutput> {
    let structure = parse_structure(doc, profile);
    let chunks = assemble_chunks(&structure.manifest, doc, profile)?;
    Ok(PipelineOutput { structure, chunks })
}
