//! Version-0 to version-1536696950 converters
//!
//! Field-by-field copies. The only value that changes type is the run
//! result amount, rebuilt as a [`Link`] from its sign and magnitude.

use nodestore_core::{BigNumber, Link};

use super::records::{JobRun, RunResult, TaskRun};
use crate::migration0 as v0;

/// Convert a job run
pub fn convert_job_run(prior: v0::JobRun) -> JobRun {
    JobRun {
        id: prior.id,
        job_id: prior.job_id,
        result: convert_run_result(prior.result),
        status: prior.status,
        task_runs: convert_task_runs(prior.task_runs),
        created_at: prior.created_at,
        completed_at: prior.completed_at,
        initiator: prior.initiator,
        creation_height: prior.creation_height,
        overrides: convert_run_result(prior.overrides),
    }
}

/// Convert a run result
pub fn convert_run_result(prior: v0::RunResult) -> RunResult {
    RunResult {
        job_run_id: prior.job_run_id,
        data: prior.data,
        status: prior.status,
        error_message: prior.error_message,
        amount: prior.amount.map(convert_amount),
    }
}

/// Convert task runs element-wise, keeping order and count
pub fn convert_task_runs(prior: Vec<v0::TaskRun>) -> Vec<TaskRun> {
    prior
        .into_iter()
        .map(|task_run| TaskRun {
            id: task_run.id,
            result: convert_run_result(task_run.result),
            status: task_run.status,
            task: task_run.task,
        })
        .collect()
}

/// Rebuild a raw big integer as a Link
pub fn convert_amount(amount: BigNumber) -> Link {
    Link::from(amount)
}
