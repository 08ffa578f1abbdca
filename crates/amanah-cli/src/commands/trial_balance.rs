use crate::cli::GlobalFlags;
use crate::cli::root_commands::TrialBalanceArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `amanah trial-balance`.
pub async fn handle(
    args: &TrialBalanceArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let trial = ctx.service.trial_balance(args.as_of).await?;
    output(&trial, flags.format)
}
