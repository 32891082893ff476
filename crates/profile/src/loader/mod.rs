//! Filesystem loading of profile YAML files.
//!
//! [`load_profile`] parses one file, [`load_and_compile`] adds validation and
//! compilation, and [`load_dir`] scans a directory of profiles reporting a
//! per-file status without aborting on the first failure.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::compiled::CompiledProfile;
use crate::error::{ProfileError, Result};
use crate::schema::ManualProfile;
use crate::validation::{validate_profile, ValidationResult};

/// Outcome of loading a single profile file.
#[derive(Debug)]
pub struct LoadResult {
    pub path: PathBuf,
    pub status: LoadStatus,
}

#[derive(Debug)]
pub enum LoadStatus {
    /// Parsed and validated; may still carry warnings.
    Loaded {
        manual_id: String,
        validation: ValidationResult,
    },
    /// Parsed but validation found errors.
    Invalid { validation: ValidationResult },
    /// Unreadable or not valid YAML for the schema.
    Failed { error: String },
}

/// Parse a profile file without validating it.
pub fn load_profile(path: &Path) -> Result<ManualProfile> {
    let contents = fs::read_to_string(path)?;
    let profile = ManualProfile::from_yaml_str(&contents)?;
    Ok(profile)
}

/// Parse, validate and compile. Validation errors abort; warnings are logged.
pub fn load_and_compile(path: &Path) -> Result<CompiledProfile> {
    let profile = load_profile(path)?;
    let validation = validate_profile(&profile);
    for w in &validation.warnings {
        warn!(manual_id = %profile.manual_id, path = %w.path, "{}", w.message);
    }
    if !validation.valid {
        return Err(ProfileError::Invalid(validation.error_messages()));
    }
    let compiled = profile.compile()?;
    info!(
        manual_id = %compiled.manual_id,
        levels = compiled.levels.len(),
        path = %path.display(),
        "loaded profile"
    );
    Ok(compiled)
}

fn is_profile_file(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'));
    let yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e == "yaml" || e == "yml");
    !hidden && yaml && path.is_file()
}

/// Parse and validate one file, capturing the outcome instead of failing.
pub fn load_file(path: &Path) -> LoadResult {
    let status = match load_profile(path) {
        Ok(profile) => {
            let validation = validate_profile(&profile);
            if validation.valid {
                LoadStatus::Loaded {
                    manual_id: profile.manual_id,
                    validation,
                }
            } else {
                LoadStatus::Invalid { validation }
            }
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to load profile");
            LoadStatus::Failed {
                error: e.to_string(),
            }
        }
    };
    LoadResult {
        path: path.to_path_buf(),
        status,
    }
}

/// Load every `*.yaml` / `*.yml` file directly under `dir`, sorted by path.
pub fn load_dir(dir: &Path) -> Result<Vec<LoadResult>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| is_profile_file(p))
        .collect();
    paths.sort();

    Ok(paths.iter().map(|p| load_file(p)).collect())
}
