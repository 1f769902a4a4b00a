//! Versioned schema migrations for nodestore
//!
//! This crate evolves persisted record shapes across releases:
//! - VersionId: numerically ordered schema version identifiers
//! - Migration: one versioned unit; `convert_records` is its bulk step
//! - migration0 / migration1536696950: frozen record families and converters
//! - Runner: applies an explicit list in order, fail-fast, returns a RunReport
//! - RunnerConfig: `migrations.toml` (ledger, dry run, target version)
//! - ledger: opt-in record of applied versions
//!
//! # Example
//!
//! ```
//! use nodestore_migrations::{standard_migrations, Runner};
//! use nodestore_storage::MemoryStore;
//!
//! let store = MemoryStore::new();
//! let report = Runner::new(standard_migrations()).unwrap().run(&store).unwrap();
//! assert_eq!(report.len(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod ledger;
pub mod migration;
pub mod migration0;
pub mod migration1536696950;
pub mod runner;
pub mod version;

pub use config::{RunnerConfig, CONFIG_FILE_NAME};
pub use error::{MigrationError, Result};
pub use ledger::AppliedMigration;
pub use migration::{convert_records, Migration, MigrationContext, MigrationOutcome, SkipReason};
pub use migration0::Migration0;
pub use migration1536696950::Migration1536696950;
pub use runner::{RunReport, Runner};
pub use version::VersionId;

/// Every released migration, oldest first
pub fn standard_migrations() -> Vec<Box<dyn Migration>> {
    vec![Box::new(Migration0), Box::new(Migration1536696950)]
}
