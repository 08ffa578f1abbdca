//! JSONL run-trail record for batch jobs.
//!
//! Each line records one event of a migration or backfill run: a skipped
//! row, or the final report. The trail is an operator log, not a source of
//! truth; the ledger itself carries the idempotency markers.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Current trail record version.
pub const TRAIL_VERSION: u32 = 1;

/// What a trail record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TrailEvent {
    RowSkipped,
    RunCompleted,
    RunAborted,
}

/// A single JSONL trail line.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct JobTrailRecord {
    pub v: u32,
    pub ts: String,
    pub job: String,
    pub run_id: String,
    pub event: TrailEvent,
    pub data: serde_json::Value,
}
