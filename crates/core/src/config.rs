use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

// ── Top-level config ──────────────────────────────────────────

/// Process-level settings. Document-family settings live in the profile YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory searched for `<name>.yaml` when a profile is given by name.
    pub profile_dir: PathBuf,
    /// Root directory for manifest and chunk output.
    pub output_dir: PathBuf,
    /// Fallback tracing filter when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile_dir: PathBuf::from("profiles"),
            output_dir: PathBuf::from("output"),
            log_filter: "warn".to_string(),
        }
    }
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            profile_dir: PathBuf::from(env_or(
                "MANUAL_PROFILE_DIR",
                &defaults.profile_dir.to_string_lossy(),
            )),
            output_dir: PathBuf::from(env_or(
                "MANUAL_OUTPUT_DIR",
                &defaults.output_dir.to_string_lossy(),
            )),
            log_filter: env_or("MANUAL_LOG", &defaults.log_filter),
        }
    }

    /// Resolve a profile argument: an existing path wins, otherwise
    /// `<profile_dir>/<name>.yaml`.
    pub fn resolve_profile(&self, name_or_path: &str) -> PathBuf {
        let direct = PathBuf::from(name_or_path);
        if direct.exists() {
            return direct;
        }
        self.profile_dir.join(format!("{name_or_path}.yaml"))
    }

    /// Output directory for one manual.
    pub fn manual_output_dir(&self, manual_id: &str) -> PathBuf {
        self.output_dir.join(manual_id)
    }

    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  profiles:    dir={}", self.profile_dir.display());
        tracing::info!("  output:      dir={}", self.output_dir.display());
        tracing::info!("  log:         filter={}", self.log_filter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_profile_falls_back_to_profile_dir() {
        let config = Config {
            profile_dir: PathBuf::from("/nonexistent/profiles"),
            ..Config::default()
        };
        assert_eq!(
            config.resolve_profile("xj-1999"),
            PathBuf::from("/nonexistent/profiles/xj-1999.yaml")
        );
    }

    #[test]
    fn manual_output_dir_nests_by_manual_id() {
        let config = Config::default();
        assert_eq!(
            config.manual_output_dir("tm9-8014"),
            PathBuf::from("output/tm9-8014")
        );
    }
}
