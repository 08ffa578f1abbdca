//! Repository methods on `LedgerService`, one module per concern.

pub mod accounts;
pub mod audit;
pub mod business;
pub mod entries;
pub mod legacy;
pub mod reports;
