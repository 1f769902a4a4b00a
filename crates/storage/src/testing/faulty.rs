//! Fault-injecting store wrapper

use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::warn;

use crate::error::{Result, StoreError};
use crate::schema::{RecordKey, Schema};
use crate::traits::{ObjectStore, Transaction};

/// Which operations fail
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaultPlan {
    /// Fail opening a writable transaction
    pub fail_on_begin: bool,
    /// Fail the n-th save (1-based, counted across all transactions)
    pub fail_on_save: Option<usize>,
    /// Fail every commit
    pub fail_on_commit: bool,
    /// Fail reads of this bucket
    pub fail_on_read: Option<String>,
}

impl FaultPlan {
    /// Plan that never fails
    pub fn none() -> Self {
        Self::default()
    }

    /// Fail the n-th save
    pub fn fail_on_save(n: usize) -> Self {
        FaultPlan {
            fail_on_save: Some(n),
            ..Self::default()
        }
    }

    /// Fail every commit
    pub fn fail_on_commit() -> Self {
        FaultPlan {
            fail_on_commit: true,
            ..Self::default()
        }
    }

    /// Fail opening writable transactions
    pub fn fail_on_begin() -> Self {
        FaultPlan {
            fail_on_begin: true,
            ..Self::default()
        }
    }

    /// Fail reads of one bucket
    pub fn fail_on_read(bucket: impl Into<String>) -> Self {
        FaultPlan {
            fail_on_read: Some(bucket.into()),
            ..Self::default()
        }
    }
}

/// Store wrapper that injects backend failures
#[derive(Debug)]
pub struct FaultyStore<S> {
    inner: S,
    plan: FaultPlan,
    saves: AtomicUsize,
    injected: AtomicUsize,
}

impl<S: ObjectStore> FaultyStore<S> {
    /// Wrap a store
    pub fn new(inner: S, plan: FaultPlan) -> Self {
        FaultyStore {
            inner,
            plan,
            saves: AtomicUsize::new(0),
            injected: AtomicUsize::new(0),
        }
    }

    /// The wrapped store
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Unwrap the store
    pub fn into_inner(self) -> S {
        self.inner
    }

    /// Saves attempted through this wrapper
    pub fn saves_attempted(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Failures injected so far
    pub fn faults_injected(&self) -> usize {
        self.injected.load(Ordering::SeqCst)
    }

    fn inject(&self, point: &str) -> StoreError {
        self.injected.fetch_add(1, Ordering::SeqCst);
        warn!(point, "Injecting store fault");
        StoreError::Backend(format!("injected fault at {}", point))
    }
}

impl<S: ObjectStore> ObjectStore for FaultyStore<S> {
    fn initialize_schema(&self, schema: &Schema) -> Result<()> {
        self.inner.initialize_schema(schema)
    }

    fn read_all(&self, bucket: &str) -> Result<Vec<Vec<u8>>> {
        if self.plan.fail_on_read.as_deref() == Some(bucket) {
            return Err(self.inject("read"));
        }
        self.inner.read_all(bucket)
    }

    fn begin(&self, writable: bool) -> Result<Box<dyn Transaction + '_>> {
        if writable && self.plan.fail_on_begin {
            return Err(self.inject("begin"));
        }
        let inner = self.inner.begin(writable)?;
        Ok(Box::new(FaultyTransaction {
            inner,
            fail_on_save: self.plan.fail_on_save,
            fail_on_commit: self.plan.fail_on_commit,
            saves: &self.saves,
            injected: &self.injected,
        }))
    }
}

/// Transaction opened through a [`FaultyStore`]
pub struct FaultyTransaction<'a> {
    inner: Box<dyn Transaction + 'a>,
    fail_on_save: Option<usize>,
    fail_on_commit: bool,
    saves: &'a AtomicUsize,
    injected: &'a AtomicUsize,
}

impl FaultyTransaction<'_> {
    fn inject(&self, point: &str) -> StoreError {
        self.injected.fetch_add(1, Ordering::SeqCst);
        warn!(point, "Injecting store fault");
        StoreError::Backend(format!("injected fault at {}", point))
    }
}

impl Transaction for FaultyTransaction<'_> {
    fn is_writable(&self) -> bool {
        self.inner.is_writable()
    }

    fn save(&mut self, bucket: &str, key: RecordKey, document: Vec<u8>) -> Result<()> {
        let n = self.saves.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_save == Some(n) {
            return Err(self.inject("save"));
        }
        self.inner.save(bucket, key, document)
    }

    fn next_sequence(&mut self, bucket: &str) -> Result<u64> {
        self.inner.next_sequence(bucket)
    }

    fn pending_writes(&self) -> usize {
        self.inner.pending_writes()
    }

    fn commit(self: Box<Self>) -> Result<()> {
        if self.fail_on_commit {
            let err = self.inject("commit");
            // A failed commit leaves nothing behind
            self.inner.rollback()?;
            return Err(err);
        }
        self.inner.commit()
    }

    fn rollback(self: Box<Self>) -> Result<()> {
        self.inner.rollback()
    }
}
