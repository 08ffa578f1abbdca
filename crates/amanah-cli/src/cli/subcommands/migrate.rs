use clap::Subcommand;

/// Migration job commands.
#[derive(Clone, Debug, Subcommand)]
pub enum MigrateCommands {
    /// Move legacy income/expense lines onto liability accounts.
    Liability {
        /// Compute and verify, then roll back.
        #[arg(long)]
        dry_run: bool,
    },
    /// Backfill ledger entries for legacy savings rows.
    Savings,
}
