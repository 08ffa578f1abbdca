use amanah_core::responses::BalanceResponse;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::BalanceArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `amanah balance`.
pub async fn handle(
    args: &BalanceArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let balance = ctx.service.account_balance(&args.code, args.as_of).await?;
    output(
        &BalanceResponse {
            account_code: args.code.clone(),
            as_of: args.as_of,
            balance,
        },
        flags.format,
    )
}
