use clap::Subcommand;

/// Chart of accounts commands.
#[derive(Clone, Debug, Subcommand)]
pub enum AccountCommands {
    /// Create an account.
    Create {
        #[arg(long)]
        code: String,
        #[arg(long)]
        name: String,
        /// asset, liability, equity, income, expense
        #[arg(long = "type")]
        account_type: String,
        /// debit or credit; defaults to the type's normal side
        #[arg(long)]
        normal_balance: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        parent: Option<String>,
    },
    /// Stop an account from accepting postings.
    Deactivate { code: String },
    /// List accounts.
    List {
        #[arg(long = "type")]
        account_type: Option<String>,
        /// Only active (true) or only retired (false) accounts.
        #[arg(long)]
        active: Option<bool>,
        #[arg(long)]
        parent: Option<String>,
    },
    /// Show one account by code.
    Get { code: String },
}
