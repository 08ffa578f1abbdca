//! Report shapes for balances and financial statements.
//!
//! The store aggregates lines into per-account [`AccountBalance`] rows; the
//! assembly of those rows into statements is pure and lives here.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{AccountType, NormalBalance};
use crate::period::DateRange;

/// Totals for one account over some window of lines.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AccountBalance {
    pub account_code: String,
    pub name: String,
    pub account_type: AccountType,
    pub normal_balance: NormalBalance,
    pub total_debit: Decimal,
    pub total_credit: Decimal,
    /// Balance in the account's natural direction.
    pub balance: Decimal,
}

impl AccountBalance {
    /// Build a row, deriving `balance` from the normal-balance convention.
    #[must_use]
    pub fn new(
        account_code: String,
        name: String,
        account_type: AccountType,
        normal_balance: NormalBalance,
        total_debit: Decimal,
        total_credit: Decimal,
    ) -> Self {
        Self {
            balance: normal_balance.signed_balance(total_debit, total_credit),
            account_code,
            name,
            account_type,
            normal_balance,
            total_debit,
            total_credit,
        }
    }
}

/// A group of account rows with their summed totals.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct StatementSection {
    pub rows: Vec<AccountBalance>,
    pub total_debit: Decimal,
    pub total_credit: Decimal,
    pub total: Decimal,
}

impl StatementSection {
    #[must_use]
    pub fn from_rows(rows: Vec<AccountBalance>) -> Self {
        let total_debit = rows.iter().map(|r| r.total_debit).sum();
        let total_credit = rows.iter().map(|r| r.total_credit).sum();
        let total = rows.iter().map(|r| r.balance).sum();
        Self {
            rows,
            total_debit,
            total_credit,
            total,
        }
    }
}

/// Point-in-time position, cumulative up to `as_of`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct BalanceSheet {
    pub as_of: NaiveDate,
    pub assets: StatementSection,
    pub liabilities: StatementSection,
    pub equity: StatementSection,
    /// Cumulative income minus expenses up to `as_of`, reported under equity.
    pub retained_earnings: Decimal,
    pub total_assets: Decimal,
    pub total_liabilities: Decimal,
    /// Equity accounts plus retained earnings.
    pub total_equity: Decimal,
    /// `total_assets - (total_liabilities + total_equity)`, never hidden.
    pub reconciliation_gap: Decimal,
    pub tolerance: Decimal,
    /// Whether the gap is within `tolerance`.
    pub is_balanced: bool,
}

/// Period flows over `[start, end]`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct IncomeStatement {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub revenue: StatementSection,
    pub expenses: StatementSection,
    pub total_revenue: Decimal,
    pub total_expenses: Decimal,
    pub net_income: Decimal,
}

/// Balance sheet and income statement for one date range.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct FinancialStatement {
    pub balance_sheet: BalanceSheet,
    pub income_statement: IncomeStatement,
}

impl FinancialStatement {
    /// Assemble both statements from aggregated account rows.
    ///
    /// `cumulative` holds every account's totals up to `range.end`;
    /// `period` holds income and expense totals within `range` only.
    #[must_use]
    pub fn assemble(
        range: DateRange,
        cumulative: Vec<AccountBalance>,
        period: Vec<AccountBalance>,
        tolerance: Decimal,
    ) -> Self {
        let mut assets = Vec::new();
        let mut liabilities = Vec::new();
        let mut equity = Vec::new();
        let mut retained_earnings = Decimal::ZERO;
        for row in cumulative {
            match row.account_type {
                AccountType::Asset => assets.push(row),
                AccountType::Liability => liabilities.push(row),
                AccountType::Equity => equity.push(row),
                AccountType::Income => retained_earnings += row.balance,
                AccountType::Expense => retained_earnings -= row.balance,
            }
        }

        let assets = StatementSection::from_rows(assets);
        let liabilities = StatementSection::from_rows(liabilities);
        let equity = StatementSection::from_rows(equity);
        let total_assets = assets.total;
        let total_liabilities = liabilities.total;
        let total_equity = equity.total + retained_earnings;
        let reconciliation_gap = total_assets - (total_liabilities + total_equity);

        let (revenue, expenses): (Vec<_>, Vec<_>) = period
            .into_iter()
            .filter(|row| !row.account_type.is_balance_sheet())
            .partition(|row| row.account_type == AccountType::Income);
        let revenue = StatementSection::from_rows(revenue);
        let expenses = StatementSection::from_rows(expenses);
        let total_revenue = revenue.total;
        let total_expenses = expenses.total;

        Self {
            balance_sheet: BalanceSheet {
                as_of: range.end,
                assets,
                liabilities,
                equity,
                retained_earnings,
                total_assets,
                total_liabilities,
                total_equity,
                reconciliation_gap,
                tolerance,
                is_balanced: reconciliation_gap.abs() <= tolerance,
            },
            income_statement: IncomeStatement {
                start: range.start,
                end: range.end,
                revenue,
                expenses,
                total_revenue,
                total_expenses,
                net_income: total_revenue - total_expenses,
            },
        }
    }
}

/// Every account's totals, checking that debits equal credits overall.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TrialBalance {
    pub as_of: Option<NaiveDate>,
    pub rows: Vec<AccountBalance>,
    pub total_debit: Decimal,
    pub total_credit: Decimal,
    pub is_balanced: bool,
}

impl TrialBalance {
    #[must_use]
    pub fn from_rows(as_of: Option<NaiveDate>, rows: Vec<AccountBalance>) -> Self {
        let section = StatementSection::from_rows(rows);
        Self {
            as_of,
            is_balanced: section.total_debit == section.total_credit,
            total_debit: section.total_debit,
            total_credit: section.total_credit,
            rows: section.rows,
        }
    }
}
