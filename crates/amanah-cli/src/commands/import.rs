use std::path::Path;

use amanah_db::repos::legacy::LegacyTable;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ImportArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `amanah import`.
pub async fn handle(args: &ImportArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let table: LegacyTable = args.table.parse()?;
    let response = ctx
        .service
        .import_legacy_jsonl(table, Path::new(&args.file))
        .await?;
    output(&response, flags.format)
}
