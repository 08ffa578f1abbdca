//! ID prefixes for every persisted record.
//!
//! IDs are generated in SQL as `{prefix}-{16 hex chars}`.

pub const PREFIX_ACCOUNT: &str = "acc";
pub const PREFIX_ENTRY: &str = "je";
pub const PREFIX_LINE: &str = "jl";
pub const PREFIX_TRANSACTION: &str = "txn";
pub const PREFIX_PAYMENT: &str = "pay";

/// Marker stored in entry and transaction metadata for backfilled rows.
pub const LEGACY_REFERENCE_KEY: &str = "legacy_reference_id";

/// Build the legacy reference marker for a savings row.
///
/// The source table is part of the marker so IDs from different legacy
/// tables can never collide.
#[must_use]
pub fn legacy_savings_reference(row_id: &str) -> String {
    format!("legacy_savings:{row_id}")
}
