//! Central schema registry for all Amanah types.
//!
//! The `SchemaRegistry` builds JSON Schemas from amanah-core types at
//! construction time using [`schemars::schema_for!`] and provides validation
//! via `jsonschema`.

use std::collections::HashMap;

use schemars::schema_for;
use serde::de::DeserializeOwned;

use crate::error::SchemaError;

/// Central store of all JSON Schemas in the ledger.
pub struct SchemaRegistry {
    schemas: HashMap<&'static str, serde_json::Value>,
}

/// Insert a schema into the map, converting the `schemars` output to a
/// `serde_json::Value`. Panics if `serde_json::to_value` fails (should be
/// infallible for valid `schemars` output).
macro_rules! register {
    ($map:expr, $name:expr, $ty:ty) => {
        $map.insert($name, serde_json::to_value(schema_for!($ty)).unwrap());
    };
}

impl SchemaRegistry {
    /// Build a new registry containing the entity, input, report, and trail
    /// schemas from amanah-core.
    ///
    /// # Panics
    ///
    /// Panics if `serde_json::to_value` fails on any `schemars`-generated
    /// schema. This is not expected in practice because `schemars` always
    /// produces valid JSON-serialisable output.
    #[must_use]
    pub fn new() -> Self {
        let mut schemas = HashMap::new();

        // --- Entity types (8) ---
        register!(schemas, "account", amanah_core::entities::Account);
        register!(schemas, "new_account", amanah_core::entities::NewAccount);
        register!(schemas, "ledger_entry", amanah_core::entities::LedgerEntry);
        register!(schemas, "ledger_line", amanah_core::entities::LedgerLine);
        register!(schemas, "transaction", amanah_core::entities::Transaction);
        register!(schemas, "payment", amanah_core::entities::Payment);
        register!(schemas, "legacy_record", amanah_core::entities::LegacyRecord);
        register!(
            schemas,
            "legacy_savings_transaction",
            amanah_core::entities::LegacySavingsTransaction
        );

        // --- Inputs (1) ---
        register!(
            schemas,
            "posting_request",
            amanah_core::posting::PostingRequest
        );

        // --- Reports (4) ---
        register!(
            schemas,
            "account_balance",
            amanah_core::reports::AccountBalance
        );
        register!(
            schemas,
            "financial_statement",
            amanah_core::reports::FinancialStatement
        );
        register!(schemas, "trial_balance", amanah_core::reports::TrialBalance);
        register!(
            schemas,
            "category_audit_report",
            amanah_core::audit::CategoryAuditReport
        );

        // --- Job and CLI responses (5) ---
        register!(
            schemas,
            "liability_migration_report",
            amanah_core::responses::LiabilityMigrationReport
        );
        register!(
            schemas,
            "backfill_report",
            amanah_core::responses::BackfillReport
        );
        register!(
            schemas,
            "backfill_outcome",
            amanah_core::responses::BackfillOutcome
        );
        register!(
            schemas,
            "import_response",
            amanah_core::responses::ImportResponse
        );
        register!(
            schemas,
            "balance_response",
            amanah_core::responses::BalanceResponse
        );

        // --- Trail envelope (1) ---
        register!(
            schemas,
            "job_trail_record",
            amanah_core::trail::JobTrailRecord
        );

        Self { schemas }
    }

    /// Get a schema by name. Returns `None` if not found.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.schemas.get(name)
    }

    /// Validate a JSON value against a named schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NotFound` if the schema name is unknown, or
    /// `SchemaError::ValidationFailed` if validation produces errors.
    pub fn validate(&self, name: &str, instance: &serde_json::Value) -> Result<(), SchemaError> {
        let schema = self
            .get(name)
            .ok_or_else(|| SchemaError::NotFound(name.to_string()))?;

        let validator = jsonschema::validator_for(schema)
            .map_err(|e| SchemaError::Generation(format!("{e}")))?;

        let errors: Vec<String> = validator
            .iter_errors(instance)
            .map(|e| format!("{e}"))
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::ValidationFailed { errors })
        }
    }

    /// Validate `instance` against `name`, then deserialize it.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Self::validate`], or `SchemaError::Deserialize`
    /// when serde rejects a value the schema accepted.
    pub fn parse<T: DeserializeOwned>(
        &self,
        name: &str,
        instance: serde_json::Value,
    ) -> Result<T, SchemaError> {
        self.validate(name, &instance)?;
        Ok(serde_json::from_value(instance)?)
    }

    /// List all registered schema names.
    #[must_use]
    pub fn list(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.schemas.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Number of registered schemas.
    #[must_use]
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amanah_core::enums::RefType;
    use amanah_core::posting::PostingRequest;
    use amanah_core::entities::LegacyRecord;
    use rust_decimal_macros::dec;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::new()
    }

    #[test]
    fn registry_has_expected_count() {
        // 8 entities + 1 input + 4 reports + 5 responses + 1 trail = 19
        assert_eq!(registry().schema_count(), 19);
    }

    #[test]
    fn registry_list_is_sorted() {
        let names = registry().list();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }

    #[test]
    fn get_nonexistent_schema() {
        assert!(registry().get("finding").is_none());
    }

    #[test]
    fn parse_accepts_a_posting_request() {
        let request: PostingRequest = registry()
            .parse(
                "posting_request",
                serde_json::json!({
                    "ref_type": "donation",
                    "ref_id": "don-771",
                    "posted_at": "2026-01-05T09:30:00Z",
                    "lines": [
                        {"account_code": "1020", "debit": "100000"},
                        {"account_code": "2010", "credit": "100000"}
                    ]
                }),
            )
            .unwrap();
        assert_eq!(request.ref_type, RefType::Donation);
        assert_eq!(request.lines[0].debit, dec!(100000));
    }

    #[test]
    fn validate_rejects_invalid_ref_type() {
        let result = registry().validate(
            "posting_request",
            &serde_json::json!({
                "ref_type": "gift",
                "ref_id": "x",
                "posted_at": "2026-01-05T09:30:00Z",
                "lines": []
            }),
        );
        if let Err(SchemaError::ValidationFailed { errors }) = result {
            assert!(!errors.is_empty());
        } else {
            panic!("Expected ValidationFailed");
        }
    }

    #[test]
    fn validate_rejects_legacy_record_without_amount() {
        let invalid = serde_json::json!({
            "id": "trx-1",
            "record_type": "donation",
            "occurred_at": "2025-03-01T00:00:00Z"
        });
        let result: Result<LegacyRecord, _> = registry().parse("legacy_record", invalid);
        assert!(matches!(result, Err(SchemaError::ValidationFailed { .. })));
    }

    #[test]
    fn validate_nonexistent_schema_returns_not_found() {
        let result = registry().validate("bogus", &serde_json::json!({}));
        assert!(matches!(result, Err(SchemaError::NotFound(_))));
    }

    #[test]
    fn all_expected_schemas_present() {
        let reg = registry();
        let expected = [
            "account",
            "new_account",
            "ledger_entry",
            "ledger_line",
            "transaction",
            "payment",
            "legacy_record",
            "legacy_savings_transaction",
            "posting_request",
            "account_balance",
            "financial_statement",
            "trial_balance",
            "category_audit_report",
            "liability_migration_report",
            "backfill_report",
            "backfill_outcome",
            "import_response",
            "balance_response",
            "job_trail_record",
        ];
        for name in &expected {
            assert!(reg.get(name).is_some(), "Missing expected schema: {name}");
        }
    }
}
