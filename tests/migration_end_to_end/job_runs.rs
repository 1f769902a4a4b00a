//! Job run conversion through the full migration list:
//! - N prior runs become N current runs in one commit
//! - A failure at begin or at any save leaves the store untouched
//! - A second run is a no-op

use nodestore::migration0 as v0;
use nodestore::migration1536696950 as v1;
use nodestore::record;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use nodestore::testing::{FaultPlan, FaultyStore};
use nodestore::{
    migrate, standard_migrations, MemoryStore, Migration, MigrationContext, MigrationError,
    MigrationOutcome, ObjectStore, Runner, RunnerConfig, SkipReason, StoreError, VersionId,
};

use crate::common::*;

const N: usize = 25;

fn link_version() -> VersionId {
    VersionId::from(v1::VERSION)
}

#[test]
fn n_prior_runs_become_n_current_runs() {
    init_tracing();
    let store = v0_store(N);
    let prior = record::read_all::<v0::JobRun>(&store).unwrap();
    let commits_before = store.stats().commits;

    let report = migrate(&store, RunnerConfig::default()).unwrap();

    assert_eq!(
        report.outcome(&link_version()),
        Some(MigrationOutcome::Migrated { records: N })
    );
    assert_eq!(store.stats().commits, commits_before + 1);

    let current = record::read_all::<v1::JobRun>(&store).unwrap();
    assert_eq!(current.len(), prior.len());
    for (old, new) in prior.iter().zip(&current) {
        assert_eq!(old.id, new.id);
        assert_eq!(old.status, new.status);
        assert_eq!(old.created_at, new.created_at);
        assert_eq!(old.task_runs.len(), new.task_runs.len());
        assert_eq!(
            old.result.amount.as_ref().map(|a| a.to_string()),
            new.result.amount.as_ref().map(|a| a.to_string())
        );
    }
}

#[test]
fn secondary_indexes_follow_converted_runs() {
    let store = v0_store(N);
    migrate(&store, RunnerConfig::default()).unwrap();

    let completed = store
        .find_by_index("JobRun", "status", &serde_json::json!("completed"))
        .unwrap();
    assert_eq!(completed.len(), (0..N).filter(|i| i % 3 == 0).count());
}

#[test]
fn failure_at_kth_save_leaves_no_current_records() {
    init_tracing();
    for k in [1, 2, N / 2, N] {
        let store = FaultyStore::new(v0_store(N), FaultPlan::fail_on_save(k));
        let before = store.inner().snapshot();

        let err = migrate(&store, RunnerConfig::default()).unwrap_err();
        assert_eq!(err.failed_version(), Some(&link_version()), "k = {}", k);

        // Re-read immediately: every record is still version 0
        assert_eq!(store.inner().snapshot(), before, "k = {}", k);
        assert_eq!(record::read_all::<v0::JobRun>(store.inner()).unwrap().len(), N);
        assert!(record::read_all::<v1::JobRun>(store.inner()).is_err());
        assert_eq!(store.inner().stats().rollbacks, 1);
    }
}

#[test]
fn failed_commit_leaves_no_current_records() {
    let store = FaultyStore::new(v0_store(N), FaultPlan::fail_on_commit());
    let before = store.inner().snapshot();

    assert!(migrate(&store, RunnerConfig::default()).is_err());
    assert_eq!(store.inner().snapshot(), before);
}

/// Later version that only records whether it ran
struct Marker {
    ran: Arc<AtomicBool>,
}

impl Migration for Marker {
    fn identifier(&self) -> VersionId {
        VersionId::from(v1::VERSION + 1)
    }

    fn apply(
        &self,
        _store: &dyn ObjectStore,
        _ctx: &MigrationContext,
    ) -> Result<MigrationOutcome, MigrationError> {
        self.ran.store(true, Ordering::SeqCst);
        Ok(MigrationOutcome::SchemaInitialized)
    }
}

#[test]
fn failed_begin_aborts_run() {
    init_tracing();
    let store = FaultyStore::new(v0_store(N), FaultPlan::fail_on_begin());
    let before = store.inner().snapshot();
    let commits_before = store.inner().stats().commits;
    let ran = Arc::new(AtomicBool::new(false));

    let mut migrations = standard_migrations();
    migrations.push(Box::new(Marker { ran: Arc::clone(&ran) }));
    let err = Runner::new(migrations).unwrap().run(&store).unwrap_err();

    assert_eq!(err.failed_version(), Some(&link_version()));
    assert!(matches!(
        err.root_cause(),
        MigrationError::Store(StoreError::Backend(_))
    ));
    assert!(!ran.load(Ordering::SeqCst));
    assert_eq!(store.saves_attempted(), 0);
    assert_eq!(store.inner().snapshot(), before);
    assert_eq!(store.inner().stats().commits, commits_before);
}

#[test]
fn unreadable_prior_bucket_aborts_run() {
    let store = FaultyStore::new(v0_store(3), FaultPlan::fail_on_read("JobRun"));
    let err = migrate(&store, RunnerConfig::default()).unwrap_err();
    assert_eq!(err.failed_version(), Some(&link_version()));
    assert_eq!(store.saves_attempted(), 0);
}

#[test]
fn second_run_is_a_no_op() {
    let store = v0_store(N);
    migrate(&store, RunnerConfig::default()).unwrap();
    let after_first = store.snapshot();
    let commits = store.stats().commits;

    let report = migrate(&store, RunnerConfig::default()).unwrap();

    assert_eq!(
        report.outcome(&link_version()),
        Some(MigrationOutcome::Skipped(SkipReason::AlreadyCurrent))
    );
    assert_eq!(store.snapshot(), after_first);
    assert_eq!(store.stats().commits, commits);
}

#[test]
fn empty_store_has_nothing_to_migrate() {
    let store = MemoryStore::new();
    let report = migrate(&store, RunnerConfig::default()).unwrap();

    assert_eq!(
        report.outcome(&VersionId::from(v0::VERSION)),
        Some(MigrationOutcome::SchemaInitialized)
    );
    assert_eq!(
        report.outcome(&link_version()),
        Some(MigrationOutcome::Skipped(SkipReason::NoPriorRecords))
    );
    assert_eq!(report.records_written(), 0);
}

#[test]
fn corrupt_prior_record_reports_decode_error() {
    let store = v0_store(2);
    let mut docs = vec![v0_job_run(0)];
    docs[0]["createdAt"] = serde_json::json!("yesterday");
    seed_v0(&store, &docs);
    let before = store.snapshot();

    let err = migrate(&store, RunnerConfig::default()).unwrap_err();
    assert!(err.root_cause().to_string().contains("JobRun"));
    assert_eq!(store.snapshot(), before);
}
