//! Offline batch jobs: the liability-model migration and the savings backfill.
//!
//! Both are idempotent. Every row decision is driven by a pure read of the
//! ledger before anything is written, so an interrupted run can simply be
//! started again.

pub mod backfill;
pub mod liability;

use amanah_core::period::storage_timestamp;
use amanah_core::trail::{JobTrailRecord, TRAIL_VERSION, TrailEvent};
use chrono::Utc;

use crate::error::DatabaseError;
use crate::trail::writer::TrailWriter;

/// Identity of one job run, stamped on every trail record it writes.
pub(crate) struct JobRun {
    job: &'static str,
    run_id: String,
}

impl JobRun {
    pub(crate) fn start(job: &'static str) -> Self {
        Self {
            job,
            run_id: format!("{job}-{}", Utc::now().format("%Y%m%dT%H%M%S%.3fZ")),
        }
    }

    pub(crate) fn record(
        &self,
        trail: &TrailWriter,
        event: TrailEvent,
        data: serde_json::Value,
    ) -> Result<(), DatabaseError> {
        trail.append(&JobTrailRecord {
            v: TRAIL_VERSION,
            ts: storage_timestamp(Utc::now()),
            job: self.job.to_string(),
            run_id: self.run_id.clone(),
            event,
            data,
        })
    }
}
