use std::path::Path;

use ratsorat_util::errors::ResolveError;
use serde::{Deserialize, Serialize};

/// Tuning knobs for a compiled resolver, usually loaded from `ratsorat.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResolverConfig {
    /// Upper bound on bulk-resolution passes before giving up.
    #[serde(default = "default_max_passes")]
    pub max_passes: usize,

    /// Maximum top-level resolutions in flight per pass. Unset means unbounded.
    #[serde(default)]
    pub max_concurrency: Option<usize>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_passes: default_max_passes(),
            max_concurrency: None,
        }
    }
}

fn default_max_passes() -> usize {
    1024
}

impl ResolverConfig {
    pub fn from_toml_str(content: &str) -> miette::Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ResolveError::Config {
            message: format!("Failed to parse resolver config: {e}"),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> miette::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ResolveError::Config {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Load the configuration at `path`, or return defaults if the file doesn't exist.
    pub fn load(path: &Path) -> miette::Result<Self> {
        if path.is_file() {
            Self::from_path(path)
        } else {
            tracing::debug!("No resolver config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Reject limits that would stop bulk resolution from making progress.
    pub fn validate(&self) -> Result<(), ResolveError> {
        if self.max_passes == 0 {
            return Err(ResolveError::Config {
                message: "max-passes must be at least 1".to_string(),
            });
        }
        if self.max_concurrency == Some(0) {
            return Err(ResolveError::Config {
                message: "max-concurrency must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
