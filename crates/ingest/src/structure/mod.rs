//! Structural parsing: boundary detection, false-positive filtering and
//! manifest construction.

mod detector;
mod diagnostics;
mod filter;
mod manifest;

pub use detector::{detect_boundaries, match_level, match_line, resolve_level, LevelMatch};
pub use diagnostics::{BoundaryDiagnostics, SuspectBoundary, FALSE_POSITIVE_MAX_WORDS};
pub use filter::{
    blank_before_pass, filter_boundaries, known_id_pass, min_content_pass, min_gap_pass,
    validate_boundaries, FilterContext, FilterPass, FILTER_PASSES,
};
pub use manifest::build_manifest;
