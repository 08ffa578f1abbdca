//! Chart of accounts repository.
//!
//! Accounts are keyed by their stable `code`. They are never deleted; a
//! retired code is deactivated and stops accepting postings.

use amanah_core::entities::{Account, NewAccount};
use amanah_core::enums::AccountType;
use amanah_core::errors::LedgerError;
use amanah_core::ids::PREFIX_ACCOUNT;
use amanah_core::period::storage_timestamp;
use chrono::Utc;
use libsql::Connection;

use crate::error::DatabaseError;
use crate::helpers::{generate_id, get_bool, get_opt_string, parse_datetime, parse_enum};
use crate::service::{LedgerService, begin_write, finish_write};

pub(crate) const ACCOUNT_COLS: &str = "id, code, name, account_type, normal_balance, category, parent_code, is_active, created_at, updated_at";

pub(crate) fn row_to_account(row: &libsql::Row) -> Result<Account, DatabaseError> {
    Ok(Account {
        id: row.get::<String>(0)?,
        code: row.get::<String>(1)?,
        name: row.get::<String>(2)?,
        account_type: parse_enum(&row.get::<String>(3)?)?,
        normal_balance: parse_enum(&row.get::<String>(4)?)?,
        category: get_opt_string(row, 5)?,
        parent_code: get_opt_string(row, 6)?,
        is_active: get_bool(row, 7)?,
        created_at: parse_datetime(&row.get::<String>(8)?)?,
        updated_at: parse_datetime(&row.get::<String>(9)?)?,
    })
}

/// Filter criteria for account listings.
#[derive(Debug, Default)]
pub struct AccountFilter {
    pub account_type: Option<AccountType>,
    pub active: Option<bool>,
    /// Accounts whose `parent_code` equals this code.
    pub parent_code: Option<String>,
}

/// Look an account up by code on an existing connection.
pub(crate) async fn find_account(
    conn: &Connection,
    code: &str,
) -> Result<Option<Account>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {ACCOUNT_COLS} FROM accounts WHERE code = ?1"),
            [code],
        )
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row_to_account(&row)?)),
        None => Ok(None),
    }
}

pub(crate) async fn load_accounts(
    conn: &Connection,
    filter: &AccountFilter,
) -> Result<Vec<Account>, DatabaseError> {
    let mut conditions = Vec::new();
    let mut params: Vec<libsql::Value> = Vec::new();

    if let Some(account_type) = filter.account_type {
        params.push(libsql::Value::Text(account_type.as_str().to_string()));
        conditions.push(format!("account_type = ?{}", params.len()));
    }
    if let Some(active) = filter.active {
        params.push(libsql::Value::Integer(i64::from(active)));
        conditions.push(format!("is_active = ?{}", params.len()));
    }
    if let Some(ref parent) = filter.parent_code {
        params.push(libsql::Value::Text(parent.clone()));
        conditions.push(format!("parent_code = ?{}", params.len()));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };
    let sql = format!("SELECT {ACCOUNT_COLS} FROM accounts {where_clause} ORDER BY code");

    let mut rows = conn.query(&sql, libsql::params_from_iter(params)).await?;
    let mut accounts = Vec::new();
    while let Some(row) = rows.next().await? {
        accounts.push(row_to_account(&row)?);
    }
    Ok(accounts)
}

impl LedgerService {
    /// Add an account to the chart.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::DuplicateCode` if the code exists,
    /// `LedgerError::InvalidNormalBalance` for a wrong type/balance pairing,
    /// and `LedgerError::Validation` for a missing parent or one of a
    /// different type.
    pub async fn create_account(&self, new: &NewAccount) -> Result<Account, DatabaseError> {
        new.validate()?;

        let conn = self.db().writer().await;
        let tx = begin_write(&conn).await?;
        let result = insert_account(&tx, new).await;
        let account = finish_write(tx, result).await?;

        tracing::info!(code = %account.code, account_type = %account.account_type, "created account");
        Ok(account)
    }

    /// Mark an account non-postable. History stays untouched.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NotFound` if no account has this code.
    pub async fn deactivate_account(&self, code: &str) -> Result<Account, DatabaseError> {
        let conn = self.db().writer().await;
        let tx = begin_write(&conn).await?;
        let result = async {
            let changed = tx
                .execute(
                    "UPDATE accounts SET is_active = 0, updated_at = ?1 WHERE code = ?2",
                    libsql::params![storage_timestamp(Utc::now()), code],
                )
                .await?;
            if changed == 0 {
                return Err(account_not_found(code));
            }
            find_account(&tx, code)
                .await?
                .ok_or(DatabaseError::NoResult)
        }
        .await;
        let account = finish_write(tx, result).await?;

        tracing::info!(code, "deactivated account");
        Ok(account)
    }

    /// Look up an account by code, active or not.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NotFound` if no account has this code.
    pub async fn resolve_account(&self, code: &str) -> Result<Account, DatabaseError> {
        let conn = self.db().reader().await?;
        find_account(&conn, code)
            .await?
            .ok_or_else(|| account_not_found(code))
    }

    /// List accounts ordered by code.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_accounts(&self, filter: &AccountFilter) -> Result<Vec<Account>, DatabaseError> {
        let conn = self.db().reader().await?;
        load_accounts(&conn, filter).await
    }
}

async fn insert_account(conn: &Connection, new: &NewAccount) -> Result<Account, DatabaseError> {
    if find_account(conn, &new.code).await?.is_some() {
        return Err(LedgerError::DuplicateCode {
            code: new.code.clone(),
        }
        .into());
    }
    if let Some(parent_code) = new.parent_code.as_deref() {
        let parent = find_account(conn, parent_code).await?.ok_or_else(|| {
            LedgerError::Validation(format!(
                "parent account {parent_code} of {} does not exist",
                new.code
            ))
        })?;
        if parent.account_type != new.account_type {
            return Err(LedgerError::Validation(format!(
                "parent account {parent_code} is {}, {} is {}",
                parent.account_type, new.code, new.account_type
            ))
            .into());
        }
    }

    let id = generate_id(conn, PREFIX_ACCOUNT).await?;
    let now = storage_timestamp(Utc::now());
    conn.execute(
        "INSERT INTO accounts (id, code, name, account_type, normal_balance, category, parent_code, is_active, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8, ?8)",
        libsql::params![
            id.as_str(),
            new.code.as_str(),
            new.name.as_str(),
            new.account_type.as_str(),
            new.normal_balance.as_str(),
            new.category.as_deref(),
            new.parent_code.as_deref(),
            now.as_str()
        ],
    )
    .await?;

    find_account(conn, &new.code)
        .await?
        .ok_or(DatabaseError::NoResult)
}

fn account_not_found(code: &str) -> DatabaseError {
    LedgerError::NotFound {
        entity_type: "account".into(),
        id: code.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seeded_service, test_service};
    use amanah_core::enums::NormalBalance;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn create_and_resolve_account() {
        let svc = test_service().await;
        let created = svc
            .create_account(
                &NewAccount::new("1020", "Bank", AccountType::Asset).with_category("bank"),
            )
            .await
            .unwrap();
        assert!(created.id.starts_with("acc-"));
        assert_eq!(created.normal_balance, NormalBalance::Debit);
        assert!(created.is_active);

        let resolved = svc.resolve_account("1020").await.unwrap();
        assert_eq!(resolved, created);
    }

    #[tokio::test]
    async fn duplicate_code_is_rejected() {
        let svc = seeded_service().await;
        let err = svc
            .create_account(&NewAccount::new("1020", "Another Bank", AccountType::Asset))
            .await
            .unwrap_err();
        assert_eq!(
            err.ledger(),
            Some(&LedgerError::DuplicateCode {
                code: "1020".into()
            })
        );
    }

    #[tokio::test]
    async fn invalid_normal_balance_is_rejected_before_insert() {
        let svc = test_service().await;
        let mut account = NewAccount::new("2010", "Donation Liability", AccountType::Liability);
        account.normal_balance = NormalBalance::Debit;
        let err = svc.create_account(&account).await.unwrap_err();
        assert!(matches!(
            err.ledger(),
            Some(LedgerError::InvalidNormalBalance { .. })
        ));
        assert!(svc.resolve_account("2010").await.is_err());
    }

    #[tokio::test]
    async fn child_accounts_must_share_parent_type() {
        let svc = seeded_service().await;
        let child = svc
            .create_account(
                &NewAccount::new("1021", "Bank BSI", AccountType::Asset).with_parent("1020"),
            )
            .await
            .unwrap();
        assert_eq!(child.parent_code.as_deref(), Some("1020"));

        let err = svc
            .create_account(
                &NewAccount::new("2011", "Campaign A", AccountType::Liability).with_parent("1020"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err.ledger(), Some(LedgerError::Validation(_))));

        let err = svc
            .create_account(
                &NewAccount::new("2012", "Campaign B", AccountType::Liability).with_parent("2999"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err.ledger(), Some(LedgerError::Validation(_))));

        let children = svc
            .list_accounts(&AccountFilter {
                parent_code: Some("1020".into()),
                ..AccountFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(children.len(), 1);
    }

    #[tokio::test]
    async fn deactivation_keeps_the_account() {
        let svc = seeded_service().await;
        let account = svc.deactivate_account("4100").await.unwrap();
        assert!(!account.is_active);
        assert!(!svc.resolve_account("4100").await.unwrap().is_active);

        let active_income = svc
            .list_accounts(&AccountFilter {
                account_type: Some(AccountType::Income),
                active: Some(true),
                ..AccountFilter::default()
            })
            .await
            .unwrap();
        let codes: Vec<_> = active_income.iter().map(|a| a.code.as_str()).collect();
        assert_eq!(codes, vec!["4200"]);
    }

    #[tokio::test]
    async fn unknown_codes_are_not_found() {
        let svc = test_service().await;
        let err = svc.resolve_account("9999").await.unwrap_err();
        assert!(matches!(err.ledger(), Some(LedgerError::NotFound { .. })));
        let err = svc.deactivate_account("9999").await.unwrap_err();
        assert!(matches!(err.ledger(), Some(LedgerError::NotFound { .. })));
    }
}
