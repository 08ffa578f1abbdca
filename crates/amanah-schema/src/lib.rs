//! # amanah-schema
//!
//! JSON Schema registry and validation for Amanah.
//!
//! This crate provides:
//! - `SchemaRegistry`: central store of the JSON Schemas of every ledger type
//! - Validation of untrusted JSON (posting requests, legacy import lines) before deserialization
//! - Schema export for external tooling (`amanah schema` command)
//!
//! ## Architecture
//!
//! Types are defined in `amanah-core` with `#[derive(JsonSchema)]`.
//! This crate imports those types and provides the registry and validation layer.

mod error;
mod registry;

pub use error::SchemaError;
pub use registry::SchemaRegistry;
