//! Value fidelity across the 1536696950 migration:
//! - Unknown task parameters survive byte-for-byte in meaning
//! - Amounts up to and beyond 2^256 keep their value
//! - Initiator types come out lower-cased

use proptest::prelude::*;
use serde_json::{json, Value};

use nodestore::migration1536696950 as v1;
use nodestore::record;
use nodestore::{migrate, Link, MemoryStore, RunnerConfig};

use crate::common::*;

const TWO_POW_256: &str =
    "115792089237316195423570985008687907853269984665640564039457584007913129639936";

fn migrate_one(doc: Value) -> Value {
    let store = MemoryStore::new();
    let id = doc["id"].as_str().unwrap().to_string();
    seed_v0(&store, &[doc]);
    migrate(&store, RunnerConfig::default()).unwrap();
    raw_job_run(&store, &id)
}

fn with_amount(i: usize, digits: &str) -> Value {
    let mut doc = v0_job_run(i);
    doc["result"]["amount"] = serde_json::from_str(digits).unwrap();
    doc
}

#[test]
fn unknown_task_params_are_preserved() {
    let mut doc = v0_job_run(1);
    doc["taskRuns"][0]["task"]["body"] = json!({
        "nested": [1, 2.50, {"deep": true}],
        "huge": serde_json::from_str::<Value>("123456789012345678901234567890").unwrap()
    });
    let original_tasks: Vec<Value> = doc["taskRuns"]
        .as_array()
        .unwrap()
        .iter()
        .map(|tr| tr["task"].clone())
        .collect();

    let migrated = migrate_one(doc);

    for (i, original) in original_tasks.iter().enumerate() {
        assert_eq!(&migrated["taskRuns"][i]["task"], original);
    }
    assert_eq!(
        migrated["taskRuns"][0]["task"]["body"]["huge"].to_string(),
        "123456789012345678901234567890"
    );
}

#[test]
fn amount_of_two_pow_256_is_preserved() {
    let migrated = migrate_one(with_amount(3, TWO_POW_256));
    assert_eq!(migrated["result"]["amount"], json!(TWO_POW_256));

    let store = MemoryStore::new();
    seed_v0(&store, &[with_amount(3, TWO_POW_256)]);
    migrate(&store, RunnerConfig::default()).unwrap();
    let runs = record::read_all::<v1::JobRun>(&store).unwrap();
    let expected: Link = TWO_POW_256.parse().unwrap();
    assert_eq!(runs[0].result.amount.as_ref(), Some(&expected));
}

#[test]
fn task_run_amounts_convert_and_absent_ones_stay_absent() {
    let migrated = migrate_one(v0_job_run(7));
    assert_eq!(migrated["taskRuns"][0]["result"]["amount"], json!("7"));
    assert!(migrated["taskRuns"][1]["result"].get("amount").is_none());
    assert!(migrated["overrides"].get("amount").is_none());
}

#[test]
fn initiator_type_is_lower_cased() {
    let migrated = migrate_one(v0_job_run(2));
    assert_eq!(migrated["initiator"]["type"], json!("runlog"));
}

#[test]
fn run_fields_outside_amounts_are_unchanged() {
    let doc = v0_job_run(4);
    let migrated = migrate_one(doc.clone());
    for field in ["id", "jobId", "status", "creationHeight", "completedAt"] {
        assert_eq!(migrated[field], doc[field], "field {}", field);
    }
    assert_eq!(migrated["result"]["data"], doc["result"]["data"]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn amount_value_survives_migration(
        digits in "[1-9][0-9]{0,80}",
        negative in any::<bool>(),
    ) {
        let text = if negative { format!("-{}", digits) } else { digits };
        let migrated = migrate_one(with_amount(0, &text));
        prop_assert_eq!(&migrated["result"]["amount"], &Value::String(text));
    }
}
