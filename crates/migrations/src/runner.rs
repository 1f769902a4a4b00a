//! Migration runner
//!
//! Applies an explicit list of migrations, one at a time, in ascending
//! version order. The first failure stops the run; later migrations are not
//! attempted.

use std::collections::BTreeSet;

use tracing::{info, warn};

use nodestore_storage::ObjectStore;

use crate::config::RunnerConfig;
use crate::error::{MigrationError, Result};
use crate::ledger;
use crate::migration::{Migration, MigrationContext, MigrationOutcome, SkipReason};
use crate::version::VersionId;

/// Outcome of every migration attempted by one run, in run order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// `(version, outcome)` per attempted migration
    pub entries: Vec<(VersionId, MigrationOutcome)>,
}

impl RunReport {
    /// Outcome recorded for a version
    pub fn outcome(&self, version: &VersionId) -> Option<MigrationOutcome> {
        self.entries
            .iter()
            .find(|(v, _)| v == version)
            .map(|(_, outcome)| *outcome)
    }

    /// Versions that converted and committed records
    pub fn migrated(&self) -> Vec<&VersionId> {
        self.entries
            .iter()
            .filter(|(_, outcome)| matches!(outcome, MigrationOutcome::Migrated { .. }))
            .map(|(v, _)| v)
            .collect()
    }

    /// Total records made visible
    pub fn records_written(&self) -> usize {
        self.entries.iter().map(|(_, o)| o.records_written()).sum()
    }

    /// Number of migrations attempted
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing was attempted
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Ordered set of migrations applied against a store
pub struct Runner {
    migrations: Vec<Box<dyn Migration>>,
    config: RunnerConfig,
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("versions", &self.versions())
            .field("config", &self.config)
            .finish()
    }
}

impl Runner {
    /// Build a runner over an explicit list of migrations
    ///
    /// The list is sorted by version.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateVersion` if two migrations share an identifier.
    pub fn new(mut migrations: Vec<Box<dyn Migration>>) -> Result<Self> {
        migrations.sort_by_key(|m| m.identifier());
        for pair in migrations.windows(2) {
            let id = pair[1].identifier();
            if pair[0].identifier() == id {
                return Err(MigrationError::DuplicateVersion(id));
            }
        }
        Ok(Runner {
            migrations,
            config: RunnerConfig::default(),
        })
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }

    /// Active configuration
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Registered versions in run order
    pub fn versions(&self) -> Vec<VersionId> {
        self.migrations.iter().map(|m| m.identifier()).collect()
    }

    /// Apply every pending migration
    ///
    /// # Errors
    ///
    /// Returns `UnknownTarget` before touching the store if the configured
    /// target is not registered. Otherwise returns `Aborted` wrapping the
    /// first migration failure; migrations after it are not attempted.
    pub fn run(&self, store: &dyn ObjectStore) -> Result<RunReport> {
        if let Some(target) = &self.config.target {
            if !self.migrations.iter().any(|m| &m.identifier() == target) {
                return Err(MigrationError::UnknownTarget(target.clone()));
            }
        }

        let ctx = MigrationContext {
            dry_run: self.config.dry_run,
            ..MigrationContext::new()
        };

        let applied = if self.config.ledger {
            ledger::initialize(store)?;
            ledger::applied_versions(store)?
        } else {
            BTreeSet::new()
        };

        let mut report = RunReport::default();
        for migration in &self.migrations {
            let version = migration.identifier();

            if applied.contains(&version) {
                info!(version = %version, "Recorded in ledger, skipping");
                report
                    .entries
                    .push((version.clone(), MigrationOutcome::Skipped(SkipReason::RecordedInLedger)));
            } else {
                info!(version = %version, dry_run = ctx.dry_run, "Applying migration");
                let outcome = migration.apply(store, &ctx).map_err(|e| {
                    warn!(version = %version, error = %e, "Migration failed, stopping run");
                    MigrationError::Aborted {
                        version: version.clone(),
                        source: Box::new(e),
                    }
                })?;

                if self.config.ledger && !ctx.dry_run {
                    ledger::record_applied(store, &version, ctx.started_at)?;
                }
                report.entries.push((version.clone(), outcome));
            }

            if self.config.target.as_ref() == Some(&version) {
                info!(version = %version, "Reached target version");
                break;
            }
        }

        info!(
            attempted = report.len(),
            records = report.records_written(),
            "Migration run complete"
        );
        Ok(report)
    }
}
