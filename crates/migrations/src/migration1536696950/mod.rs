//! Version 1536696950: run result amounts become Links
//!
//! Every stored version-0 job run is read, converted, and written back into
//! the same `JobRun` bucket in one transaction.

mod convert;
mod records;

pub use convert::{convert_amount, convert_job_run, convert_run_result, convert_task_runs};
pub use records::{JobRun, RunResult, TaskRun};

use nodestore_storage::record;
use nodestore_storage::ObjectStore;

use crate::error::Result;
use crate::migration::{convert_records, Migration, MigrationContext, MigrationOutcome};
use crate::migration0 as v0;
use crate::version::VersionId;

/// Identifier of this schema version
pub const VERSION: u64 = 1536696950;

/// Link amounts migration
#[derive(Debug, Clone, Copy, Default)]
pub struct Migration1536696950;

impl Migration for Migration1536696950 {
    fn identifier(&self) -> VersionId {
        VersionId::from(VERSION)
    }

    fn apply(&self, store: &dyn ObjectStore, ctx: &MigrationContext) -> Result<MigrationOutcome> {
        record::initialize::<JobRun>(store)?;
        convert_records::<v0::JobRun, JobRun, _>(store, ctx, &self.identifier(), convert_job_run)
    }
}
