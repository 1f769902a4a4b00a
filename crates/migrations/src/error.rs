//! Error types for the migration engine

use std::path::PathBuf;

use nodestore_core::DecodeError;
use nodestore_storage::StoreError;
use thiserror::Error;

use crate::version::VersionId;

/// Result type alias for migration operations
pub type Result<T> = std::result::Result<T, MigrationError>;

/// Errors reported while configuring or running migrations
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Store adapter failure (schema init, read, begin, save, commit)
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Value could not be decoded
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Version identifier is not a base-10 integer
    #[error("invalid version identifier {input:?}")]
    InvalidVersion {
        /// Rejected text
        input: String,
    },

    /// Two migrations share a version identifier
    #[error("duplicate migration version {0}")]
    DuplicateVersion(VersionId),

    /// Configured target is not one of the registered versions
    #[error("target version {0} is not registered")]
    UnknownTarget(VersionId),

    /// A migration failed; later migrations were not attempted
    #[error("migration {version} failed: {source}")]
    Aborted {
        /// Version that failed
        version: VersionId,
        /// Underlying failure
        #[source]
        source: Box<MigrationError>,
    },

    /// Config file could not be read
    #[error("failed to read config file '{}': {source}", path.display())]
    ConfigRead {
        /// File path
        path: PathBuf,
        /// I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Config text is not valid
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl MigrationError {
    /// Version of the failed migration, for aborted runs
    pub fn failed_version(&self) -> Option<&VersionId> {
        match self {
            MigrationError::Aborted { version, .. } => Some(version),
            _ => None,
        }
    }

    /// The innermost non-abort error
    pub fn root_cause(&self) -> &MigrationError {
        match self {
            MigrationError::Aborted { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
