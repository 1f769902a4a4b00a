//! Version-0 record family
//!
//! Frozen shapes of every record as first persisted. Later versions keep
//! decoding through these types, so field names and encodings here never
//! change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use nodestore_core::{
    null_as_default, Address, BigNumber, Bytes, FlexTime, Hash, HexBig, InitiatorType, Json,
    Link, RunStatus, Signature, TaskSpec, TaskType, WebUrl,
};
use nodestore_storage::{Record, RecordKey, Schema};

// ============================================================================
// Jobs
// ============================================================================

/// Job definition: identity plus the request that created it
///
/// Persisted as one flat document; the request fields sit beside `id` and
/// `createdAt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "JobSpecDocument", into = "JobSpecDocument")]
pub struct JobSpec {
    /// Unique job id
    pub id: String,
    /// Creation time
    pub created_at: FlexTime,
    /// Request fields
    pub request: JobSpecRequest,
}

impl JobSpec {
    /// Initiators that start runs of this job
    pub fn initiators(&self) -> &[Initiator] {
        &self.request.initiators
    }

    /// Tasks run in order
    pub fn tasks(&self) -> &[TaskSpec] {
        &self.request.tasks
    }

    /// Earliest time runs may start
    pub fn start_at(&self) -> Option<DateTime<Utc>> {
        self.request.start_at
    }

    /// Latest time runs may start
    pub fn end_at(&self) -> Option<DateTime<Utc>> {
        self.request.end_at
    }
}

/// Job fields supplied by the API caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSpecRequest {
    /// Run triggers
    #[serde(default, deserialize_with = "null_as_default")]
    pub initiators: Vec<Initiator>,
    /// Pipeline of tasks
    #[serde(default, deserialize_with = "null_as_default")]
    pub tasks: Vec<TaskSpec>,
    /// Optional start bound
    #[serde(default)]
    pub start_at: Option<DateTime<Utc>>,
    /// Optional end bound
    #[serde(default)]
    pub end_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobSpecDocument {
    id: String,
    created_at: FlexTime,
    #[serde(default, deserialize_with = "null_as_default")]
    initiators: Vec<Initiator>,
    #[serde(default, deserialize_with = "null_as_default")]
    tasks: Vec<TaskSpec>,
    #[serde(default)]
    start_at: Option<DateTime<Utc>>,
    #[serde(default)]
    end_at: Option<DateTime<Utc>>,
}

impl From<JobSpecDocument> for JobSpec {
    fn from(doc: JobSpecDocument) -> Self {
        JobSpec {
            id: doc.id,
            created_at: doc.created_at,
            request: JobSpecRequest {
                initiators: doc.initiators,
                tasks: doc.tasks,
                start_at: doc.start_at,
                end_at: doc.end_at,
            },
        }
    }
}

impl From<JobSpec> for JobSpecDocument {
    fn from(spec: JobSpec) -> Self {
        JobSpecDocument {
            id: spec.id,
            created_at: spec.created_at,
            initiators: spec.request.initiators,
            tasks: spec.request.tasks,
            start_at: spec.request.start_at,
            end_at: spec.request.end_at,
        }
    }
}

impl Record for JobSpec {
    const SCHEMA: Schema = Schema::unique("JobSpec", "id", &["createdAt", "startAt", "endAt"]);

    fn key(&self) -> RecordKey {
        RecordKey::from(self.id.as_str())
    }
}

/// Run trigger attached to a job
///
/// `type` is lower-cased on decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Initiator {
    /// Auto-increment id; 0 until saved
    #[serde(default)]
    pub id: u64,
    /// Owning job
    #[serde(rename = "jobId", default)]
    pub job_id: String,
    /// Trigger kind
    #[serde(rename = "type", default)]
    pub initiator_type: InitiatorType,
    /// Cron schedule
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub schedule: String,
    /// One-shot run time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<FlexTime>,
    /// One-shot already fired
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub ran: bool,
    /// Contract address watched for log triggers
    #[serde(default)]
    pub address: Address,
}

impl Record for Initiator {
    const SCHEMA: Schema = Schema::increment("Initiator", "id", &["jobId", "type", "address"]);

    fn key(&self) -> RecordKey {
        RecordKey::Int(self.id)
    }

    fn set_sequence(&mut self, id: u64) {
        self.id = id;
    }
}

// ============================================================================
// Runs
// ============================================================================

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
    /// Payment amount, stored as a bare JSON number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<BigNumber>,
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

/// Layout of the `JobRun` bucket, shared by every version
pub const JOB_RUN_SCHEMA: Schema = Schema::unique("JobRun", "id", &["jobId", "status", "createdAt"]);

// ============================================================================
// Ethereum transactions
// ============================================================================

/// Outgoing transaction with its latest attempt
///
/// Persisted as one flat document holding both the transaction and the
/// attempt fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "TxDocument", into = "TxDocument")]
pub struct Tx {
    /// Auto-increment id; 0 until saved
    pub id: u64,
    /// Sender
    pub from: Address,
    /// Recipient
    pub to: Address,
    /// Call data
    pub data: Option<Bytes>,
    /// Sender nonce
    pub nonce: u64,
    /// Wei transferred
    pub value: Option<BigNumber>,
    /// Gas limit
    pub gas_limit: u64,
    /// Latest broadcast attempt
    pub attempt: TxAttempt,
}

impl Tx {
    /// Hash of the latest attempt
    pub fn hash(&self) -> &Hash {
        &self.attempt.hash
    }

    /// Gas price of the latest attempt
    pub fn gas_price(&self) -> Option<&BigNumber> {
        self.attempt.gas_price.as_ref()
    }

    /// True once the latest attempt is confirmed
    pub fn confirmed(&self) -> bool {
        self.attempt.confirmed
    }

    /// Signed raw transaction of the latest attempt
    pub fn hex(&self) -> &str {
        &self.attempt.hex
    }

    /// Block height the latest attempt was sent at
    pub fn sent_at(&self) -> u64 {
        self.attempt.sent_at
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TxDocument {
    #[serde(rename = "ID", default)]
    id: u64,
    #[serde(default)]
    from: Address,
    #[serde(default)]
    to: Address,
    #[serde(default)]
    data: Option<Bytes>,
    #[serde(default)]
    nonce: u64,
    #[serde(default)]
    value: Option<BigNumber>,
    #[serde(default)]
    gas_limit: u64,
    #[serde(default)]
    hash: Hash,
    #[serde(rename = "TxID", default)]
    tx_id: u64,
    #[serde(default)]
    gas_price: Option<BigNumber>,
    #[serde(default)]
    confirmed: bool,
    #[serde(default)]
    hex: String,
    #[serde(default)]
    sent_at: u64,
}

impl From<TxDocument> for Tx {
    fn from(doc: TxDocument) -> Self {
        Tx {
            id: doc.id,
            from: doc.from,
            to: doc.to,
            data: doc.data,
            nonce: doc.nonce,
            value: doc.value,
            gas_limit: doc.gas_limit,
            attempt: TxAttempt {
                hash: doc.hash,
                tx_id: doc.tx_id,
                gas_price: doc.gas_price,
                confirmed: doc.confirmed,
                hex: doc.hex,
                sent_at: doc.sent_at,
            },
        }
    }
}

impl From<Tx> for TxDocument {
    fn from(tx: Tx) -> Self {
        TxDocument {
            id: tx.id,
            from: tx.from,
            to: tx.to,
            data: tx.data,
            nonce: tx.nonce,
            value: tx.value,
            gas_limit: tx.gas_limit,
            hash: tx.attempt.hash,
            tx_id: tx.attempt.tx_id,
            gas_price: tx.attempt.gas_price,
            confirmed: tx.attempt.confirmed,
            hex: tx.attempt.hex,
            sent_at: tx.attempt.sent_at,
        }
    }
}

impl Record for Tx {
    const SCHEMA: Schema = Schema::increment("Tx", "ID", &["ID", "From", "Nonce", "Hash", "TxID"]);

    fn key(&self) -> RecordKey {
        RecordKey::Int(self.id)
    }

    fn set_sequence(&mut self, id: u64) {
        self.id = id;
    }
}

/// One broadcast of a transaction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TxAttempt {
    /// Transaction hash
    #[serde(default)]
    pub hash: Hash,
    /// Owning transaction
    #[serde(rename = "TxID", default)]
    pub tx_id: u64,
    /// Gas price offered
    #[serde(default)]
    pub gas_price: Option<BigNumber>,
    /// Confirmed on chain
    #[serde(default)]
    pub confirmed: bool,
    /// Signed raw transaction
    #[serde(default)]
    pub hex: String,
    /// Block height when sent
    #[serde(default)]
    pub sent_at: u64,
}

impl Record for TxAttempt {
    const SCHEMA: Schema = Schema::unique("TxAttempt", "Hash", &["TxID"]);

    fn key(&self) -> RecordKey {
        RecordKey::from(self.hash.to_string())
    }
}

// ============================================================================
// Everything else
// ============================================================================

/// External adapter reachable over HTTP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeType {
    /// Task type name the bridge answers to
    pub name: TaskType,
    /// Endpoint
    pub url: WebUrl,
    /// Confirmations required by default
    #[serde(default)]
    pub default_confirmations: u64,
    /// Token the bridge presents to the node
    #[serde(default)]
    pub incoming_token: String,
    /// Token the node presents to the bridge
    #[serde(default)]
    pub outgoing_token: String,
}

impl Record for BridgeType {
    const SCHEMA: Schema = Schema::unique("BridgeType", "name", &[]);

    fn key(&self) -> RecordKey {
        RecordKey::from(self.name.as_str())
    }
}

/// Block number as tracked by the head listener
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexableBlockNumber {
    /// Block number
    pub number: HexBig,
    /// Decimal digits in `number`
    #[serde(default)]
    pub digits: usize,
    /// Block hash
    #[serde(default)]
    pub hash: Hash,
}

impl Record for IndexableBlockNumber {
    const SCHEMA: Schema = Schema::unique("IndexableBlockNumber", "number", &["digits"]);

    fn key(&self) -> RecordKey {
        RecordKey::from(self.number.to_string())
    }
}

/// Operator account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Login email
    pub email: String,
    /// Password hash
    #[serde(default)]
    pub hashed_password: String,
    /// Creation time
    pub created_at: FlexTime,
}

impl Record for User {
    const SCHEMA: Schema = Schema::unique("User", "email", &["createdAt"]);

    fn key(&self) -> RecordKey {
        RecordKey::from(self.email.as_str())
    }
}

/// Operator login session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Session id
    pub id: String,
    /// Last request seen
    pub last_used: FlexTime,
}

impl Record for Session {
    const SCHEMA: Schema = Schema::unique("Session", "id", &["lastUsed"]);

    fn key(&self) -> RecordKey {
        RecordKey::from(self.id.as_str())
    }
}

/// Payment terms of a service agreement
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Encumbrance {
    /// Payment per request
    #[serde(default)]
    pub payment: Option<Link>,
    /// Seconds the agreement stays valid
    #[serde(default)]
    pub expiration: u64,
    /// Participating oracle addresses (EIP-55)
    #[serde(default, deserialize_with = "null_as_default")]
    pub oracles: Vec<String>,
}

/// Signed agreement to run a job for a requester
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceAgreement {
    /// Creation time
    #[serde(rename = "createdAt")]
    pub created_at: FlexTime,
    /// Payment terms
    #[serde(default)]
    pub encumbrance: Encumbrance,
    /// Agreement id
    pub id: String,
    /// Job the agreement covers
    #[serde(rename = "jobSpecID", default)]
    pub job_spec_id: String,
    /// Original request body
    #[serde(rename = "requestBody", default)]
    pub request_body: String,
    /// Oracle signature over the agreement
    #[serde(default)]
    pub signature: Signature,
    /// Job definition
    #[serde(rename = "JobSpec")]
    pub job_spec: JobSpec,
}

impl Record for ServiceAgreement {
    const SCHEMA: Schema = Schema::unique("ServiceAgreement", "id", &["createdAt"]);

    fn key(&self) -> RecordKey {
        RecordKey::from(self.id.as_str())
    }
}
