use crate::cli::GlobalFlags;
use crate::cli::subcommands::MigrateCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `amanah migrate`.
pub async fn handle(
    action: &MigrateCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        MigrateCommands::Liability { dry_run } => {
            let report = ctx.service.migrate_liability_model(*dry_run).await?;
            if !report.missing_sources.is_empty() && !flags.quiet {
                eprintln!(
                    "warning: mapped codes not in the chart: {}",
                    report.missing_sources.join(", ")
                );
            }
            output(&report, flags.format)
        }
        MigrateCommands::Savings => {
            let report = ctx.service.backfill_savings().await?;
            output(&report, flags.format)
        }
    }
}
