//! Error types for profile loading and compilation.

/// Errors that can occur while loading or compiling a profile.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    /// Filesystem I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse/deserialization error.
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A configured regex failed to compile.
    #[error("invalid pattern in {field}: {source}")]
    Pattern {
        field: String,
        #[source]
        source: regex::Error,
    },

    /// Validation found blocking errors.
    #[error("profile validation failed: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Result alias for profile operations.
pub type Result<T> = std::result::Result<T, ProfileError>;
