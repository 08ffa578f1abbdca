use chrono::{DateTime, Utc};
use serde::Serialize;

use amanah_core::entities::LedgerEntry;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct ReverseResponse {
    reversed: String,
    reversal: LedgerEntry,
}

pub async fn run(
    id: &str,
    posted_at: Option<DateTime<Utc>>,
    memo: Option<&str>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let reversal = ctx.service.reverse_entry(id, posted_at, memo).await?;
    output(
        &ReverseResponse {
            reversed: id.to_string(),
            reversal,
        },
        flags.format,
    )
}
