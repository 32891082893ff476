//! Structural parsing and chunk assembly for paged service manuals.
//!
//! The engine is pure: it takes cleaned page text and a compiled profile and
//! returns a manifest and an ordered chunk list. [`persist`] handles the
//! files around it.

pub mod chunker;
pub mod persist;
pub mod pipeline;
pub mod structure;

pub use chunker::assemble_chunks;
pub use persist::{load_chunks, load_manifest, save_chunks, save_manifest, ManualStore};
pub use pipeline::{parse_structure, run_pipeline, PipelineOutput, StructureOutput};
pub use structure::{build_manifest, detect_boundaries, filter_boundaries, BoundaryDiagnostics};

#[cfg(test)]
mod test_support;
