//! Runner behavior over the released migrations:
//! - Applied-migrations ledger
//! - Dry run and target version
//! - Config file loading
//! - Fail-fast ordering with an injected failing migration

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tempfile::TempDir;

use nodestore::migration0 as v0;
use nodestore::migration1536696950 as v1;
use nodestore::record;
use nodestore::{
    migrate, migrate_with_config_file, standard_migrations, Migration, MigrationContext,
    MigrationError, MigrationOutcome, ObjectStore, Runner, RunnerConfig, SkipReason, StoreError,
    VersionId,
};

use crate::common::*;

#[test]
fn ledger_records_and_skips_applied_versions() {
    init_tracing();
    let store = v0_store(4);
    let config = RunnerConfig {
        ledger: true,
        ..RunnerConfig::default()
    };

    let first = migrate(&store, config.clone()).unwrap();
    assert_eq!(first.records_written(), 4);

    let second = migrate(&store, config).unwrap();
    for (_, outcome) in &second.entries {
        assert_eq!(*outcome, MigrationOutcome::Skipped(SkipReason::RecordedInLedger));
    }
    assert_eq!(store.len("Migration"), Some(2));
}

#[test]
fn dry_run_reports_count_and_keeps_prior_records() {
    let store = v0_store(6);
    let before = store.snapshot();

    let report = migrate(
        &store,
        RunnerConfig {
            dry_run: true,
            ..RunnerConfig::default()
        },
    )
    .unwrap();

    assert_eq!(
        report.outcome(&VersionId::from(v1::VERSION)),
        Some(MigrationOutcome::DryRun { records: 6 })
    );
    assert_eq!(store.snapshot(), before);
    assert_eq!(record::read_all::<v0::JobRun>(&store).unwrap().len(), 6);
}

#[test]
fn target_stops_before_later_versions() {
    let store = v0_store(3);
    let report = migrate(
        &store,
        RunnerConfig {
            target: Some(VersionId::from(v0::VERSION)),
            ..RunnerConfig::default()
        },
    )
    .unwrap();

    assert_eq!(report.len(), 1);
    assert!(report.outcome(&VersionId::from(v1::VERSION)).is_none());
    assert_eq!(record::read_all::<v0::JobRun>(&store).unwrap().len(), 3);
}

#[test]
fn config_file_drives_the_run() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(nodestore::CONFIG_FILE_NAME);
    std::fs::write(&path, "dry_run = true\n").unwrap();

    let store = v0_store(2);
    let report = migrate_with_config_file(&store, &path).unwrap();
    assert_eq!(
        report.outcome(&VersionId::from(v1::VERSION)),
        Some(MigrationOutcome::DryRun { records: 2 })
    );

    let missing = dir.path().join("absent.toml");
    let report = migrate_with_config_file(&store, &missing).unwrap();
    assert_eq!(report.records_written(), 2);
}

#[test]
fn malformed_config_file_stops_before_any_migration() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(nodestore::CONFIG_FILE_NAME);
    std::fs::write(&path, "dry_run = \"maybe\"\n").unwrap();

    let store = v0_store(2);
    let before = store.snapshot();
    let err = migrate_with_config_file(&store, &path).unwrap_err();
    assert!(matches!(err, MigrationError::ConfigParse(_)));
    assert_eq!(store.snapshot(), before);
}

/// Fails on apply and remembers that it ran
struct Broken {
    ran: Arc<AtomicBool>,
}

impl Migration for Broken {
    fn identifier(&self) -> VersionId {
        VersionId::from(1)
    }

    fn apply(
        &self,
        _store: &dyn ObjectStore,
        _ctx: &MigrationContext,
    ) -> Result<MigrationOutcome, MigrationError> {
        self.ran.store(true, Ordering::SeqCst);
        Err(StoreError::Backend("volume detached".to_string()).into())
    }
}

#[test]
fn failing_migration_stops_later_versions() {
    let store = v0_store(5);
    let ran = Arc::new(AtomicBool::new(false));
    let mut migrations = standard_migrations();
    migrations.push(Box::new(Broken {
        ran: Arc::clone(&ran),
    }));

    let runner = Runner::new(migrations).unwrap();
    assert_eq!(
        runner.versions(),
        vec![
            VersionId::from(0),
            VersionId::from(1),
            VersionId::from(v1::VERSION)
        ]
    );

    let err = runner.run(&store).unwrap_err();
    assert!(ran.load(Ordering::SeqCst));
    assert_eq!(err.failed_version(), Some(&VersionId::from(1)));
    assert!(err.to_string().contains("volume detached"));

    // 1536696950 never ran
    assert_eq!(record::read_all::<v0::JobRun>(&store).unwrap().len(), 5);
}

#[test]
fn duplicate_registration_is_rejected() {
    let mut migrations = standard_migrations();
    migrations.extend(standard_migrations());
    assert!(matches!(
        Runner::new(migrations),
        Err(MigrationError::DuplicateVersion(_))
    ));
}
