use chrono::{DateTime, Utc};
use clap::Subcommand;

/// Journal entry commands.
#[derive(Clone, Debug, Subcommand)]
pub enum EntryCommands {
    /// Show an entry by ID or entry number.
    Get { id: String },
    /// List entries, newest first.
    List {
        #[arg(long)]
        ref_type: Option<String>,
        #[arg(long)]
        ref_id: Option<String>,
        /// YYYY-MM
        #[arg(long)]
        period: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
    /// Void a posted entry.
    Void {
        id: String,
        #[arg(long)]
        reason: String,
    },
    /// Post the mirror of an entry and mark the original reversed.
    Reverse {
        id: String,
        /// RFC 3339 timestamp; defaults to now.
        #[arg(long)]
        posted_at: Option<DateTime<Utc>>,
        #[arg(long)]
        memo: Option<String>,
    },
}
