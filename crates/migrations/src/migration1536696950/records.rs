//! Version-1536696950 record family
//!
//! Run results carry their payment amount as a [`Link`], persisted as a
//! base-10 JSON string. Every other field keeps its version-0 shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use nodestore_core::{null_as_default, HexBig, Json, Link, RunStatus, TaskSpec};
use nodestore_storage::{Record, RecordKey, Schema};

use crate::migration0::{Initiator, JOB_RUN_SCHEMA};

/// Output of a task or whole run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// Run this result belongs to
    #[serde(rename = "jobRunId", default)]
    pub job_run_id: String,
    /// Adapter output
    #[serde(default)]
    pub data: Json,
    /// Status after the step
    #[serde(default)]
    pub status: RunStatus,
    /// Failure message
    #[serde(rename = "error", default)]
    pub error_message: Option<String>,
    /// Payment amount
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Link>,
}

/// Execution of one task within a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskRun {
    /// Task run id
    pub id: String,
    /// Task output
    #[serde(default)]
    pub result: RunResult,
    /// Task status
    #[serde(default)]
    pub status: RunStatus,
    /// Task definition as of the run
    #[serde(default)]
    pub task: TaskSpec,
}

/// Execution of a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRun {
    /// Run id
    pub id: String,
    /// Job being run
    #[serde(default)]
    pub job_id: String,
    /// Final output
    #[serde(default)]
    pub result: RunResult,
    /// Run status
    #[serde(default)]
    pub status: RunStatus,
    /// Task executions, in pipeline order
    #[serde(default, deserialize_with = "null_as_default")]
    pub task_runs: Vec<TaskRun>,
    /// Creation time (RFC 3339)
    pub created_at: DateTime<Utc>,
    /// Completion time
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// Trigger that started the run
    #[serde(default)]
    pub initiator: Initiator,
    /// Block height when created
    #[serde(default)]
    pub creation_height: Option<HexBig>,
    /// Values overriding the first task's input
    #[serde(default)]
    pub overrides: RunResult,
}

impl Record for JobRun {
    const SCHEMA: Schema = JOB_RUN_SCHEMA;

    fn key(&self) -> RecordKey {
        RecordKey::from(self.id.as_str())
    }
}
