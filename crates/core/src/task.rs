//! Task specifications and discriminators
//!
//! - [`TaskSpec`]: task type and confirmation count plus an opaque parameter
//!   bag holding every key the caller supplied
//! - [`TaskType`]: adapter name, also used as a bridge key
//! - [`InitiatorType`]: initiator discriminator, lower-cased on decode
//! - [`RunStatus`]: run lifecycle status string

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::json::{Json, Opaque};

/// Name of a task adapter (`httpget`, `ethtx`, a bridge name, ...)
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskType(String);

impl TaskType {
    /// Wrap an adapter name
    pub fn new(name: impl Into<String>) -> Self {
        TaskType(name.into())
    }

    /// Adapter name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Status of a job or task run (`pending`, `in_progress`, `completed`, ...)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunStatus(String);

impl RunStatus {
    /// Wrap a status string
    pub fn new(status: impl Into<String>) -> Self {
        RunStatus(status.into())
    }

    /// Status string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Initiator discriminator, normalized to lower case on decode
///
/// ```
/// use nodestore_core::InitiatorType;
///
/// let t: InitiatorType = serde_json::from_str("\"RunLog\"").unwrap();
/// assert_eq!(t.as_str(), "runlog");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct InitiatorType(String);

impl InitiatorType {
    /// Build a discriminator, lower-casing it
    pub fn new(name: &str) -> Self {
        InitiatorType(name.to_lowercase())
    }

    /// Lower-case discriminator
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for InitiatorType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(InitiatorType::new(&raw))
    }
}

impl fmt::Display for InitiatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The named fields of a task specification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct TaskFields {
    #[serde(rename = "type", default)]
    task_type: TaskType,
    #[serde(default)]
    confirmations: u64,
}

/// One task of a job: adapter type, confirmations, and its parameter bag
///
/// The whole input object is retained in [`TaskSpec::params`], so adapter
/// parameters this schema knows nothing about are written back unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskSpec {
    /// Adapter to run
    pub task_type: TaskType,
    /// Block confirmations required before running
    pub confirmations: u64,
    /// Entire original input object
    pub params: Json,
}

impl TaskSpec {
    /// Build a task with an explicit parameter bag
    pub fn new(task_type: TaskType, confirmations: u64, params: Json) -> Self {
        Self {
            task_type,
            confirmations,
            params,
        }
    }

    fn to_opaque(&self) -> Opaque<TaskFields> {
        Opaque::new(
            TaskFields {
                task_type: self.task_type.clone(),
                confirmations: self.confirmations,
            },
            self.params.clone(),
        )
    }
}

impl Serialize for TaskSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_opaque().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TaskSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let Opaque { known, rest } = Opaque::<TaskFields>::deserialize(deserializer)?;
        Ok(TaskSpec {
            task_type: known.task_type,
            confirmations: known.confirmations,
            params: rest,
        })
    }
}
