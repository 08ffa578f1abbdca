//! JSONL run trail for batch jobs.
//!
//! When `migration.trail_dir` is set, each job appends skipped rows and its
//! final report to `{trail_dir}/{job}.jsonl`.

pub mod writer;
