mod create;
mod deactivate;
mod get;
mod list;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::AccountCommands;
use crate::context::AppContext;

/// Handle `amanah account`.
pub async fn handle(
    action: &AccountCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        AccountCommands::Create {
            code,
            name,
            account_type,
            normal_balance,
            category,
            parent,
        } => {
            create::run(
                code,
                name,
                account_type,
                normal_balance.as_deref(),
                category.as_deref(),
                parent.as_deref(),
                ctx,
                flags,
            )
            .await
        }
        AccountCommands::Deactivate { code } => deactivate::run(code, ctx, flags).await,
        AccountCommands::List {
            account_type,
            active,
            parent,
        } => list::run(account_type.as_deref(), *active, parent.as_deref(), ctx, flags).await,
        AccountCommands::Get { code } => get::run(code, ctx, flags).await,
    }
}
