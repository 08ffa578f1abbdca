use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: Commands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Account { action } => commands::account::handle(&action, ctx, flags).await,
        Commands::Post(args) => commands::post::handle(&args, ctx, flags).await,
        Commands::Entry { action } => commands::entry::handle(&action, ctx, flags).await,
        Commands::Balance(args) => commands::balance::handle(&args, ctx, flags).await,
        Commands::Statement(args) => commands::statement::handle(&args, ctx, flags).await,
        Commands::TrialBalance(args) => commands::trial_balance::handle(&args, ctx, flags).await,
        Commands::Audit(args) => commands::audit::handle(&args, ctx, flags).await,
        Commands::Import(args) => commands::import::handle(&args, ctx, flags).await,
        Commands::Migrate { action } => commands::migrate::handle(&action, ctx, flags).await,
        Commands::Schema(args) => commands::schema::handle(&args, flags),
    }
}
