//! Applied-migrations ledger
//!
//! Opt-in record of completed versions, stored in the `Migration` bucket
//! keyed by version identifier. Written in its own transaction after a
//! migration commits.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use nodestore_storage::record::{self, Record};
use nodestore_storage::{ObjectStore, RecordKey, Schema};

use crate::error::Result;
use crate::version::VersionId;

/// One completed migration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedMigration {
    /// Version applied
    pub version: VersionId,
    /// When it was applied
    #[serde(rename = "appliedAt")]
    pub applied_at: DateTime<Utc>,
}

impl Record for AppliedMigration {
    const SCHEMA: Schema = Schema::unique("Migration", "version", &["appliedAt"]);

    fn key(&self) -> RecordKey {
        RecordKey::from(self.version.as_str())
    }
}

/// Create the ledger bucket if absent
pub fn initialize(store: &dyn ObjectStore) -> Result<()> {
    Ok(record::initialize::<AppliedMigration>(store)?)
}

/// Every ledger entry, in version order
pub fn entries(store: &dyn ObjectStore) -> Result<Vec<AppliedMigration>> {
    match record::read_all::<AppliedMigration>(store) {
        Ok(mut entries) => {
            entries.sort_by(|a, b| a.version.cmp(&b.version));
            Ok(entries)
        }
        Err(e) if e.is_bucket_not_found() => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

/// Versions recorded as applied
pub fn applied_versions(store: &dyn ObjectStore) -> Result<BTreeSet<VersionId>> {
    Ok(entries(store)?.into_iter().map(|e| e.version).collect())
}

/// Record a version as applied
pub fn record_applied(
    store: &dyn ObjectStore,
    version: &VersionId,
    applied_at: DateTime<Utc>,
) -> Result<()> {
    let mut entry = AppliedMigration {
        version: version.clone(),
        applied_at,
    };
    let mut txn = store.begin(true)?;
    record::save(txn.as_mut(), &mut entry)?;
    txn.commit()?;
    debug!(version = %version, "Recorded in ledger");
    Ok(())
}
