//! Entity structs for the ledger and the records around it.
//!
//! Each entity maps to a table in the libSQL store. All structs derive
//! `Serialize`, `Deserialize`, and `JsonSchema` for JSON output and schema
//! validation of operator-supplied files.

mod account;
mod business;
mod entry;
mod legacy;

pub use account::{Account, NewAccount};
pub use business::{Payment, Transaction};
pub use entry::{LedgerEntry, LedgerLine};
pub use legacy::{LegacyRecord, LegacySavingsTransaction};
