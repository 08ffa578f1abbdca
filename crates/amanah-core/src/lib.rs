//! # amanah-core
//!
//! Core types and pure ledger rules for the Amanah double-entry ledger.
//!
//! This crate provides the foundational types shared across all Amanah crates:
//! - Account, entry, and line structs for the chart of accounts and journal
//! - Enums for account types, normal balances, and entry status transitions
//! - Posting requests and the pure validation every posting goes through
//! - Conversion between decimal amounts and stored minor units
//! - Report shapes for balances, statements, and trial balance
//! - Category audit types and the classification rule for legacy rows
//! - Batch job reports for the liability migration and savings backfill
//! - The JSONL run-trail record written by batch jobs
//! - The `LedgerError` taxonomy

pub mod audit;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod money;
pub mod period;
pub mod posting;
pub mod reports;
pub mod responses;
pub mod trail;
