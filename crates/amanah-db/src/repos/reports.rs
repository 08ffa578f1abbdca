//! Balance and report engine.
//!
//! Balances are never stored. Every figure here is a fresh aggregation of
//! ledger lines, read inside one read transaction so a report never mixes
//! two states of the ledger. Voided entries are excluded; reversed entries
//! still count because their reversal offsets them.

use amanah_core::enums::{AccountType, EntryStatus};
use amanah_core::errors::LedgerError;
use amanah_core::money::MinorUnits;
use amanah_core::period::{DateRange, as_of_upper_bound};
use amanah_core::reports::{AccountBalance, FinancialStatement, TrialBalance};
use chrono::NaiveDate;
use libsql::Connection;
use rust_decimal::Decimal;

use crate::error::DatabaseError;
use crate::helpers::{get_amount, parse_enum};
use crate::service::LedgerService;

/// Lower bound matching every stored timestamp.
const BEGINNING: &str = "";

/// SQL list of the entry statuses whose lines count toward balances.
fn counted_statuses() -> String {
    EntryStatus::ALL
        .into_iter()
        .filter(|status| status.counts_toward_balance())
        .map(|status| format!("'{status}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Aggregate line totals per account over `[lower, upper)` of `posted_at`.
///
/// Inactive accounts appear only when they carry activity in the window.
async fn aggregate(
    conn: &Connection,
    lower: &str,
    upper: &str,
    types: &[AccountType],
    units: MinorUnits,
) -> Result<Vec<AccountBalance>, DatabaseError> {
    let mut params: Vec<libsql::Value> = vec![
        libsql::Value::Text(lower.to_string()),
        libsql::Value::Text(upper.to_string()),
    ];
    let type_clause = if types.is_empty() {
        String::new()
    } else {
        let mut placeholders = Vec::with_capacity(types.len());
        for account_type in types {
            params.push(libsql::Value::Text(account_type.as_str().to_string()));
            placeholders.push(format!("?{}", params.len()));
        }
        format!("AND a.account_type IN ({})", placeholders.join(", "))
    };

    let counted = counted_statuses();
    let sql = format!(
        "SELECT a.code, a.name, a.account_type, a.normal_balance,
                COALESCE(t.total_debit, 0), COALESCE(t.total_credit, 0)
         FROM accounts a
         LEFT JOIN (
             SELECT l.account_id, SUM(l.debit) AS total_debit, SUM(l.credit) AS total_credit
             FROM ledger_lines l
             JOIN ledger_entries e ON e.id = l.entry_id
             WHERE e.status IN ({counted}) AND e.posted_at >= ?1 AND e.posted_at < ?2
             GROUP BY l.account_id
         ) t ON t.account_id = a.id
         WHERE (a.is_active = 1 OR t.account_id IS NOT NULL) {type_clause}
         ORDER BY a.code"
    );

    let mut rows = conn.query(&sql, libsql::params_from_iter(params)).await?;
    let mut balances = Vec::new();
    while let Some(row) = rows.next().await? {
        balances.push(AccountBalance::new(
            row.get::<String>(0)?,
            row.get::<String>(1)?,
            parse_enum(&row.get::<String>(2)?)?,
            parse_enum(&row.get::<String>(3)?)?,
            get_amount(&row, 4, units)?,
            get_amount(&row, 5, units)?,
        ));
    }
    Ok(balances)
}

impl LedgerService {
    /// Signed balance of one account in its natural direction.
    ///
    /// Covers every non-voided line up to the end of `as_of`, or all time.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::AccountNotFound` for an unknown code.
    pub async fn account_balance(
        &self,
        code: &str,
        as_of: Option<NaiveDate>,
    ) -> Result<Decimal, DatabaseError> {
        Ok(self.account_balance_detail(code, as_of).await?.balance)
    }

    /// Debit and credit totals of one account alongside its balance.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::AccountNotFound` for an unknown code.
    pub async fn account_balance_detail(
        &self,
        code: &str,
        as_of: Option<NaiveDate>,
    ) -> Result<AccountBalance, DatabaseError> {
        let counted = counted_statuses();
        let conn = self.db().reader().await?;
        let mut rows = conn
            .query(
                &format!(
                    "SELECT a.code, a.name, a.account_type, a.normal_balance,
                            COALESCE(SUM(CASE WHEN e.status IN ({counted}) AND e.posted_at < ?2 THEN l.debit END), 0),
                            COALESCE(SUM(CASE WHEN e.status IN ({counted}) AND e.posted_at < ?2 THEN l.credit END), 0)
                     FROM accounts a
                     LEFT JOIN ledger_lines l ON l.account_id = a.id
                     LEFT JOIN ledger_entries e ON e.id = l.entry_id
                     WHERE a.code = ?1
                     GROUP BY a.id"
                ),
                libsql::params![code, as_of_upper_bound(as_of)],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound {
                code: code.to_string(),
            })?;
        Ok(AccountBalance::new(
            row.get::<String>(0)?,
            row.get::<String>(1)?,
            parse_enum(&row.get::<String>(2)?)?,
            parse_enum(&row.get::<String>(3)?)?,
            get_amount(&row, 4, self.units())?,
            get_amount(&row, 5, self.units())?,
        ))
    }

    /// Balance sheet (cumulative to `end`) and income statement (`[start, end]`).
    ///
    /// An empty period yields all-zero aggregates.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidDateRange` if `end < start`.
    pub async fn financial_statement(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FinancialStatement, DatabaseError> {
        let range = DateRange::new(start, end)?;
        let (lower, upper) = range.bounds();

        let conn = self.db().reader().await?;
        let tx = conn.transaction().await?;
        let cumulative = aggregate(&tx, BEGINNING, &upper, &[], self.units()).await?;
        let period = aggregate(
            &tx,
            &lower,
            &upper,
            &[AccountType::Income, AccountType::Expense],
            self.units(),
        )
        .await?;
        tx.commit().await?;

        let statement = FinancialStatement::assemble(
            range,
            cumulative,
            period,
            self.config().ledger.reconciliation_tolerance,
        );
        let sheet = &statement.balance_sheet;
        if !sheet.is_balanced {
            tracing::warn!(
                gap = %sheet.reconciliation_gap,
                tolerance = %sheet.tolerance,
                "balance sheet does not reconcile for {start}..{end}"
            );
        }
        Ok(statement)
    }

    /// Every account's totals up to the end of `as_of`, or all time.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn trial_balance(&self, as_of: Option<NaiveDate>) -> Result<TrialBalance, DatabaseError> {
        let conn = self.db().reader().await?;
        let rows = aggregate(&conn, BEGINNING, &as_of_upper_bound(as_of), &[], self.units()).await?;
        Ok(TrialBalance::from_rows(as_of, rows))
    }
}
