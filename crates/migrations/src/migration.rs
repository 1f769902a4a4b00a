//! Migration unit contract
//!
//! A [`Migration`] targets exactly one schema version. [`convert_records`]
//! is the shared bulk-convert step: read every record of the prior shape,
//! convert, and write the results back in one transaction that either
//! commits as a whole or leaves the store untouched.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use nodestore_storage::record::{self, Record};
use nodestore_storage::ObjectStore;

use crate::error::Result;
use crate::version::VersionId;

/// Per-run settings handed to every migration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationContext {
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Convert and save, then roll back instead of committing
    pub dry_run: bool,
}

impl MigrationContext {
    /// Context for a normal run starting now
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            dry_run: false,
        }
    }

    /// Context for a dry run starting now
    pub fn dry_run() -> Self {
        Self {
            started_at: Utc::now(),
            dry_run: true,
        }
    }
}

impl Default for MigrationContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Why a migration wrote nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The prior version's bucket is absent or empty
    NoPriorRecords,
    /// Stored records already decode as the current version
    AlreadyCurrent,
    /// The applied-migrations ledger lists this version
    RecordedInLedger,
}

/// Result of applying one migration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// Storage shapes created; no records converted
    SchemaInitialized,
    /// Records converted and committed
    Migrated {
        /// Records written
        records: usize,
    },
    /// Records converted and saved, then rolled back
    DryRun {
        /// Records that would have been written
        records: usize,
    },
    /// Nothing to do
    Skipped(SkipReason),
}

impl MigrationOutcome {
    /// Records made visible by this migration
    pub fn records_written(&self) -> usize {
        match self {
            MigrationOutcome::Migrated { records } => *records,
            _ => 0,
        }
    }

    /// True if the migration was skipped
    pub fn is_skipped(&self) -> bool {
        matches!(self, MigrationOutcome::Skipped(_))
    }
}

/// One versioned schema migration
pub trait Migration: Send + Sync {
    /// Version this migration produces
    fn identifier(&self) -> VersionId;

    /// Bring the store to this version
    ///
    /// # Errors
    ///
    /// Returns the first store or decode failure. Any open transaction has
    /// been rolled back by then.
    fn apply(&self, store: &dyn ObjectStore, ctx: &MigrationContext) -> Result<MigrationOutcome>;
}

/// Convert every stored `P` record into a `C` record in one transaction
///
/// - An absent or empty `P` bucket is a skip (`NoPriorRecords`).
/// - If the records do not decode as `P` but do decode as `C`, the bucket
///   was already migrated (`AlreadyCurrent`). If they decode as neither, the
///   `P` decode error is returned.
/// - Any save failure rolls the transaction back and is returned.
///
/// The current schema must be initialized by the caller.
pub fn convert_records<P, C, F>(
    store: &dyn ObjectStore,
    ctx: &MigrationContext,
    version: &VersionId,
    convert: F,
) -> Result<MigrationOutcome>
where
    P: Record,
    C: Record,
    F: Fn(P) -> C,
{
    let bucket = P::SCHEMA.bucket;
    let prior = match record::read_all::<P>(store) {
        Ok(records) => records,
        Err(e) if e.is_bucket_not_found() => {
            info!(version = %version, bucket, "No prior records, skipping");
            return Ok(MigrationOutcome::Skipped(SkipReason::NoPriorRecords));
        }
        Err(e) if e.is_decode() => {
            return match record::read_all::<C>(store) {
                Ok(_) => {
                    info!(version = %version, bucket, "Records already current, skipping");
                    Ok(MigrationOutcome::Skipped(SkipReason::AlreadyCurrent))
                }
                Err(_) => Err(e.into()),
            };
        }
        Err(e) => return Err(e.into()),
    };

    if prior.is_empty() {
        info!(version = %version, bucket, "Prior bucket empty, skipping");
        return Ok(MigrationOutcome::Skipped(SkipReason::NoPriorRecords));
    }

    let records = prior.len();
    let mut txn = store.begin(true)?;
    for (position, old) in prior.into_iter().enumerate() {
        let mut current = convert(old);
        if let Err(e) = record::save(txn.as_mut(), &mut current) {
            warn!(
                version = %version,
                bucket,
                position,
                error = %e,
                "Save failed, rolling back"
            );
            if let Err(rollback) = txn.rollback() {
                warn!(version = %version, error = %rollback, "Rollback failed");
            }
            return Err(e.into());
        }
    }

    if ctx.dry_run {
        txn.rollback()?;
        info!(version = %version, bucket, records, "Dry run, rolled back");
        return Ok(MigrationOutcome::DryRun { records });
    }

    txn.commit()?;
    info!(version = %version, bucket, records, "Migration committed");
    Ok(MigrationOutcome::Migrated { records })
}
