//! Document-family profiles for the manual chunking pipeline.
//!
//! This crate provides:
//! - YAML profile schema with serde deserialization
//! - Structured validation with errors, warnings and suggestions
//! - Compilation into an immutable [`CompiledProfile`] with pre-built regexes
//!   and applicability alias tables

pub mod compiled;
pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use compiled::*;
pub use error::{ProfileError, Result};
pub use loader::{load_and_compile, load_dir, load_file, load_profile, LoadResult, LoadStatus};
pub use schema::*;
pub use validation::{validate_profile, ValidationResult};
