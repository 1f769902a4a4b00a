//! Migration End-to-End Tests
//!
//! Runs the released migrations against stores seeded with version-0 data.

#[path = "../common/mod.rs"]
mod common;

mod codecs;
mod job_runs;
mod runner;
