//! nodestore - versioned schema migrations for an embedded object store
//!
//! nodestore brings a node's persisted records (jobs, runs, transactions,
//! bridges, users) up to the current schema at startup, one version at a
//! time, each inside a single all-or-nothing transaction.
//!
//! # Quick Start
//!
//! ```
//! use nodestore::{migrate, MemoryStore, RunnerConfig};
//!
//! let store = MemoryStore::new();
//! let report = migrate(&store, RunnerConfig::default())?;
//! assert_eq!(report.len(), 2);
//! # Ok::<(), nodestore::MigrationError>(())
//! ```
//!
//! # Architecture
//!
//! - `nodestore-core`: value codecs shared by every schema version
//! - `nodestore-storage`: object-store contract and the in-memory store
//! - `nodestore-migrations`: record families, converters, runner

use std::path::Path;

use tracing::info;

pub use nodestore_core::{
    Address, BigNumber, Bytes, DecodeError, FlexTime, Hash, HexBig, InitiatorType, Json, Link,
    Opaque, RunStatus, Signature, TaskSpec, TaskType, WebUrl,
};
pub use nodestore_migrations::{
    migration0, migration1536696950, standard_migrations, Migration, MigrationContext,
    MigrationError, MigrationOutcome, RunReport, Runner, RunnerConfig, SkipReason, VersionId,
    CONFIG_FILE_NAME,
};
pub use nodestore_storage::{
    record, testing, MemoryStore, ObjectStore, Record, RecordKey, Schema, StoreError, Transaction,
};

/// Run every released migration against a store
///
/// # Errors
///
/// Returns the first migration failure; later migrations are not attempted
/// and the store holds no partial writes from the failed one.
pub fn migrate(store: &dyn ObjectStore, config: RunnerConfig) -> Result<RunReport, MigrationError> {
    let runner = Runner::new(standard_migrations())?.with_config(config);
    info!(versions = runner.versions().len(), "Starting schema migrations");
    runner.run(store)
}

/// Run every released migration with settings from a config file
///
/// A missing file means default settings.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed, or if
/// a migration fails.
pub fn migrate_with_config_file(
    store: &dyn ObjectStore,
    path: &Path,
) -> Result<RunReport, MigrationError> {
    migrate(store, RunnerConfig::load_or_default(path)?)
}
