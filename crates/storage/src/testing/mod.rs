//! Testing utilities for store atomicity
//!
//! - **Fault injection**: [`FaultyStore`] wraps any [`ObjectStore`] and fails
//!   a chosen begin, save, commit, or read with a backend error
//!
//! # Example
//!
//! ```ignore
//! use nodestore_storage::testing::{FaultPlan, FaultyStore};
//! use nodestore_storage::MemoryStore;
//!
//! // Fail the third save of any transaction opened through the wrapper
//! let store = FaultyStore::new(MemoryStore::new(), FaultPlan::fail_on_save(3));
//! ```
//!
//! [`ObjectStore`]: crate::traits::ObjectStore

mod faulty;

pub use faulty::{FaultPlan, FaultyStore, FaultyTransaction};
