use std::path::Path;

use amanah_core::posting::PostingRequest;
use anyhow::Context;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::PostArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `amanah post`.
pub async fn handle(args: &PostArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let request = read_request(ctx, Path::new(&args.file))?;
    let entry = ctx.service.post(&request).await?;
    output(&entry, flags.format)
}

fn read_request(ctx: &AppContext, path: &Path) -> anyhow::Result<PostingRequest> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read posting request {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    ctx.service
        .schema()
        .parse("posting_request", value)
        .with_context(|| format!("{} is not a valid posting request", path.display()))
}
