//! Version 0: the initial schema
//!
//! Creates the bucket and indexes of every version-0 record type. There is
//! no earlier version, so nothing is converted.

mod records;

pub use records::{
    BridgeType, Encumbrance, IndexableBlockNumber, Initiator, JobRun, JobSpec, JobSpecRequest,
    RunResult, ServiceAgreement, Session, TaskRun, Tx, TxAttempt, User, JOB_RUN_SCHEMA,
};

use tracing::info;

use nodestore_storage::record;
use nodestore_storage::ObjectStore;

use crate::error::Result;
use crate::migration::{Migration, MigrationContext, MigrationOutcome};
use crate::version::VersionId;

/// Identifier of the initial schema
pub const VERSION: u64 = 0;

/// Initial schema migration
#[derive(Debug, Clone, Copy, Default)]
pub struct Migration0;

impl Migration for Migration0 {
    fn identifier(&self) -> VersionId {
        VersionId::from(VERSION)
    }

    fn apply(&self, store: &dyn ObjectStore, _ctx: &MigrationContext) -> Result<MigrationOutcome> {
        record::initialize::<JobSpec>(store)?;
        record::initialize::<JobRun>(store)?;
        record::initialize::<Initiator>(store)?;
        record::initialize::<Tx>(store)?;
        record::initialize::<TxAttempt>(store)?;
        record::initialize::<BridgeType>(store)?;
        record::initialize::<IndexableBlockNumber>(store)?;
        record::initialize::<User>(store)?;
        record::initialize::<Session>(store)?;
        record::initialize::<ServiceAgreement>(store)?;
        info!(version = VERSION, "Initial schema ready");
        Ok(MigrationOutcome::SchemaInitialized)
    }
}
