use chrono::NaiveDate;
use clap::{Args, Subcommand};

use crate::cli::subcommands::{AccountCommands, EntryCommands, MigrateCommands};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Chart of accounts.
    Account {
        #[command(subcommand)]
        action: AccountCommands,
    },
    /// Post a journal entry from a JSON posting request.
    Post(PostArgs),
    /// Journal entries: inspect, void, reverse.
    Entry {
        #[command(subcommand)]
        action: EntryCommands,
    },
    /// Balance of one account.
    Balance(BalanceArgs),
    /// Balance sheet and income statement for a date range.
    Statement(StatementArgs),
    /// Debit and credit totals of every account.
    TrialBalance(TrialBalanceArgs),
    /// Check legacy category strings against the chart of accounts.
    Audit(AuditArgs),
    /// Load legacy rows from a JSONL file.
    Import(ImportArgs),
    /// One-shot migration jobs.
    Migrate {
        #[command(subcommand)]
        action: MigrateCommands,
    },
    /// Print a registered JSON Schema, or list them.
    Schema(SchemaArgs),
}

#[derive(Clone, Debug, Args)]
pub struct PostArgs {
    /// Path to a JSON file holding one posting request.
    pub file: String,
}

#[derive(Clone, Debug, Args)]
pub struct BalanceArgs {
    /// Account code.
    pub code: String,
    /// Include entries posted on or before this date (YYYY-MM-DD).
    #[arg(long)]
    pub as_of: Option<NaiveDate>,
}

#[derive(Clone, Debug, Args)]
pub struct StatementArgs {
    /// First day of the period (YYYY-MM-DD).
    #[arg(long)]
    pub start: NaiveDate,
    /// Last day of the period, inclusive (YYYY-MM-DD).
    #[arg(long)]
    pub end: NaiveDate,
}

#[derive(Clone, Debug, Args)]
pub struct TrialBalanceArgs {
    #[arg(long)]
    pub as_of: Option<NaiveDate>,
}

#[derive(Clone, Debug, Args)]
pub struct AuditArgs {
    #[arg(long)]
    pub start: NaiveDate,
    #[arg(long)]
    pub end: NaiveDate,
    /// all, transactions, disbursements
    #[arg(long, default_value = "all")]
    pub source: String,
    /// Substring match over description, reference, and category.
    #[arg(long)]
    pub search: Option<String>,
    /// Only rows whose category does not resolve.
    #[arg(long)]
    pub only_invalid: bool,
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    #[arg(long)]
    pub per_page: Option<u32>,
}

#[derive(Clone, Debug, Args)]
pub struct ImportArgs {
    /// transactions, disbursements, savings
    pub table: String,
    /// JSONL file, one row per line.
    pub file: String,
}

#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    /// Schema name, e.g. posting_request. Lists all names when omitted.
    pub name: Option<String>,
}
