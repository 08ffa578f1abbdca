//! Canonical transaction and payment records written by the savings backfill.

use amanah_core::entities::{Payment, Transaction};
use amanah_core::errors::LedgerError;

use crate::error::DatabaseError;
use crate::helpers::{get_amount, get_opt_string, parse_datetime, parse_enum, parse_optional_json};
use crate::service::LedgerService;

const TRANSACTION_COLS: &str =
    "id, kind, donor_ref, target_type, target_id, amount, status, occurred_at, metadata, created_at";

const PAYMENT_COLS: &str = "id, transaction_id, method, amount, status, paid_at";

impl LedgerService {
    /// # Errors
    ///
    /// Returns `LedgerError::NotFound` if no transaction has this id.
    pub async fn get_transaction(&self, id: &str) -> Result<Transaction, DatabaseError> {
        let conn = self.db().reader().await?;
        let mut rows = conn
            .query(
                &format!("SELECT {TRANSACTION_COLS} FROM transactions WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or_else(|| LedgerError::NotFound {
            entity_type: "transaction".into(),
            id: id.to_string(),
        })?;
        Ok(Transaction {
            id: row.get::<String>(0)?,
            kind: parse_enum(&row.get::<String>(1)?)?,
            donor_ref: row.get::<String>(2)?,
            target_type: get_opt_string(&row, 3)?,
            target_id: get_opt_string(&row, 4)?,
            amount: get_amount(&row, 5, self.units())?,
            status: row.get::<String>(6)?,
            occurred_at: parse_datetime(&row.get::<String>(7)?)?,
            metadata: parse_optional_json(get_opt_string(&row, 8)?.as_deref())?,
            created_at: parse_datetime(&row.get::<String>(9)?)?,
        })
    }

    /// Payments settling a transaction, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn payments_for(&self, transaction_id: &str) -> Result<Vec<Payment>, DatabaseError> {
        let conn = self.db().reader().await?;
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {PAYMENT_COLS} FROM payments WHERE transaction_id = ?1 ORDER BY paid_at, id"
                ),
                [transaction_id],
            )
            .await?;
        let mut payments = Vec::new();
        while let Some(row) = rows.next().await? {
            payments.push(Payment {
                id: row.get::<String>(0)?,
                transaction_id: row.get::<String>(1)?,
                method: row.get::<String>(2)?,
                amount: get_amount(&row, 3, self.units())?,
                status: row.get::<String>(4)?,
                paid_at: parse_datetime(&row.get::<String>(5)?)?,
            });
        }
        Ok(payments)
    }
}
