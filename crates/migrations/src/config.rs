//! Runner configuration via `migrations.toml`
//!
//! Every setting has a default, so an empty file (or no file) runs all
//! registered migrations with the read-failure skip heuristic only.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MigrationError, Result};
use crate::version::VersionId;

/// Config file name placed next to the store.
pub const CONFIG_FILE_NAME: &str = "migrations.toml";

/// Runner configuration loaded from `migrations.toml`.
///
/// # Example
///
/// ```toml
/// ledger = true
/// dry_run = false
/// target = "1536696950"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Record applied versions in the `Migration` bucket and skip them later.
    #[serde(default)]
    pub ledger: bool,
    /// Convert and save every record, then roll back instead of committing.
    #[serde(default)]
    pub dry_run: bool,
    /// Stop after applying this version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<VersionId>,
}

impl RunnerConfig {
    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Migration runner configuration
#
# Applied-migrations ledger (default: false)
#   false = a migration whose prior records are absent is treated as applied
#   true  = applied versions are recorded in the "Migration" bucket and skipped
ledger = false

# Dry run (default: false)
# Converts and saves every record, then rolls back. Schemas are still created.
dry_run = false

# Stop after this version (default: run every registered migration)
# target = "1536696950"
"#
    }

    /// Parse config text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML or names an invalid
    /// target version.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| MigrationError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Read config from a path, falling back to defaults if it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }
}
