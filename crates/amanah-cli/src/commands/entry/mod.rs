mod get;
mod list;
mod reverse;
mod void;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::EntryCommands;
use crate::context::AppContext;

/// Handle `amanah entry`.
pub async fn handle(
    action: &EntryCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        EntryCommands::Get { id } => get::run(id, ctx, flags).await,
        EntryCommands::List {
            ref_type,
            ref_id,
            period,
            status,
        } => {
            list::run(
                ref_type.as_deref(),
                ref_id.as_deref(),
                period.as_deref(),
                status.as_deref(),
                ctx,
                flags,
            )
            .await
        }
        EntryCommands::Void { id, reason } => void::run(id, reason, ctx, flags).await,
        EntryCommands::Reverse {
            id,
            posted_at,
            memo,
        } => reverse::run(id, *posted_at, memo.as_deref(), ctx, flags).await,
    }
}
