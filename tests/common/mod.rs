//! Shared fixtures for the integration suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]

use std::sync::Once;

use serde_json::{json, Value};

use nodestore::migration0::Migration0;
use nodestore::{MemoryStore, Migration, MigrationContext, ObjectStore, RecordKey};

static INIT_TRACING: Once = Once::new();

/// Route tracing output through the test harness.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

// ============================================================================
// Version-0 job run documents
// ============================================================================

const STATUSES: [&str; 3] = ["completed", "pending_confirmations", "errored"];

/// Run id for fixture index `i`
pub fn run_id(i: usize) -> String {
    format!("run-{:04}", i)
}

/// Creation timestamp for fixture index `i`
pub fn created_at(i: usize) -> String {
    format!(
        "2018-09-{:02}T{:02}:15:50.{:09}Z",
        1 + i % 28,
        i % 24,
        i * 1000
    )
}

/// A version-0 job run document as the node persisted it
///
/// Amounts are bare JSON numbers; task parameters carry adapter-specific
/// keys the schema does not model.
pub fn v0_job_run(i: usize) -> Value {
    let id = run_id(i);
    let status = STATUSES[i % STATUSES.len()];
    json!({
        "id": id,
        "jobId": format!("job-{}", i % 3),
        "result": {
            "jobRunId": id,
            "data": {"value": i.to_string()},
            "status": status,
            "error": null,
            "amount": 1000 + i
        },
        "status": status,
        "taskRuns": [
            {
                "id": format!("{}-t0", id),
                "result": {"jobRunId": id, "data": {}, "status": "completed", "error": null, "amount": i},
                "status": "completed",
                "task": {
                    "type": "httpget",
                    "confirmations": 0,
                    "url": "https://api.example.com/price",
                    "headers": {"X-Api-Key": ["secret"]}
                }
            },
            {
                "id": format!("{}-t1", id),
                "result": {"jobRunId": id, "data": null, "status": status, "error": null},
                "status": status,
                "task": {
                    "type": "ethtx",
                    "confirmations": 2,
                    "address": "0x3cb8e3fd9d27e39a5e9e6852b0e96160061fd4ea",
                    "functionSelector": "0x609ff1bd"
                }
            }
        ],
        "createdAt": created_at(i),
        "completedAt": null,
        "initiator": {
            "id": 1 + i % 3,
            "jobId": format!("job-{}", i % 3),
            "type": "RunLog",
            "address": "0x3cb8e3fd9d27e39a5e9e6852b0e96160061fd4ea"
        },
        "creationHeight": format!("0x{:x}", 6_000_000 + i),
        "overrides": {"jobRunId": "", "data": null, "status": "", "error": null}
    })
}

/// Create the version-0 schema and store documents in one transaction
pub fn seed_v0(store: &dyn ObjectStore, docs: &[Value]) {
    Migration0.apply(store, &MigrationContext::new()).unwrap();
    let mut txn = store.begin(true).unwrap();
    for doc in docs {
        let id = doc["id"].as_str().unwrap();
        txn.save("JobRun", RecordKey::from(id), serde_json::to_vec(doc).unwrap())
            .unwrap();
    }
    txn.commit().unwrap();
}

/// Memory store holding `n` version-0 job runs
pub fn v0_store(n: usize) -> MemoryStore {
    let store = MemoryStore::new();
    let docs: Vec<Value> = (0..n).map(v0_job_run).collect();
    seed_v0(&store, &docs);
    store
}

/// Stored job run document, decoded as plain JSON
pub fn raw_job_run(store: &MemoryStore, id: &str) -> Value {
    let bytes = store.get("JobRun", &RecordKey::from(id)).unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
