use crate::cli::GlobalFlags;
use crate::cli::root_commands::StatementArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `amanah statement`.
pub async fn handle(
    args: &StatementArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let statement = ctx.service.financial_statement(args.start, args.end).await?;
    if !statement.balance_sheet.is_balanced && !flags.quiet {
        eprintln!(
            "warning: balance sheet is off by {} (tolerance {})",
            statement.balance_sheet.reconciliation_gap, statement.balance_sheet.tolerance
        );
    }
    output(&statement, flags.format)
}
