//! Category-consistency auditor.
//!
//! A read-only cross-reference of legacy category strings against the chart
//! of accounts. Rows are classified in scan order; paging applies after the
//! `only_invalid` filter so page sizes stay exact.

use std::collections::BTreeSet;

use amanah_core::audit::{
    CategoryAuditQuery, CategoryAuditReport, CategoryAuditRow, CategoryIndex, InvalidCategories,
};
use amanah_core::enums::{CategoryStatus, LegacySource};

use crate::error::DatabaseError;
use crate::helpers::{contains_pattern, get_amount, get_opt_string, parse_datetime};
use crate::repos::accounts::{AccountFilter, load_accounts};
use crate::service::LedgerService;

impl LedgerService {
    /// Classify legacy rows in `query.range` and return one page of them.
    ///
    /// `invalid_categories` covers every matching row, not just the page.
    /// Missing categories are reported per row but not listed there.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidFilter` for bad paging parameters.
    pub async fn audit_categories(
        &self,
        query: &CategoryAuditQuery,
    ) -> Result<CategoryAuditReport, DatabaseError> {
        query.validate(self.config().audit.max_per_page)?;
        let (lower, upper) = query.range.bounds();
        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(contains_pattern);

        let offset = query.offset();
        let page_end = offset + u64::from(query.per_page);
        let mut matched: u64 = 0;
        let mut rows = Vec::new();
        let mut invalid_transactions = BTreeSet::new();
        let mut invalid_disbursements = BTreeSet::new();

        let conn = self.db().reader().await?;
        let tx = conn.transaction().await?;
        let index = CategoryIndex::new(&load_accounts(&tx, &AccountFilter::default()).await?);

        for source in LegacySource::ALL {
            if !query.source.includes(source) {
                continue;
            }
            let mut params: Vec<libsql::Value> = vec![
                libsql::Value::Text(lower.clone()),
                libsql::Value::Text(upper.clone()),
            ];
            let search_clause = match &search {
                Some(pattern) => {
                    params.push(libsql::Value::Text(pattern.clone()));
                    "AND (lower(COALESCE(description, '')) LIKE ?3 ESCAPE '\\'
                          OR lower(COALESCE(reference, '')) LIKE ?3 ESCAPE '\\'
                          OR lower(COALESCE(category, '')) LIKE ?3 ESCAPE '\\')"
                }
                None => "",
            };
            let sql = format!(
                "SELECT id, record_type, category, description, reference, amount, occurred_at
                 FROM {}
                 WHERE occurred_at >= ?1 AND occurred_at < ?2 {search_clause}
                 ORDER BY occurred_at, id",
                source.table()
            );

            let mut result = tx.query(&sql, libsql::params_from_iter(params)).await?;
            while let Some(row) = result.next().await? {
                let category = get_opt_string(&row, 2)?;
                let (status, matched_account) = index.classify(category.as_deref(), source);

                if status.is_invalid() && status != CategoryStatus::Missing {
                    if let Some(raw) = category.as_deref() {
                        let invalid = match source {
                            LegacySource::Transactions => &mut invalid_transactions,
                            LegacySource::Disbursements => &mut invalid_disbursements,
                        };
                        invalid.insert(raw.trim().to_string());
                    }
                }
                if query.only_invalid && !status.is_invalid() {
                    continue;
                }

                if (offset..page_end).contains(&matched) {
                    rows.push(CategoryAuditRow {
                        source,
                        id: row.get::<String>(0)?,
                        record_type: row.get::<String>(1)?,
                        category,
                        description: get_opt_string(&row, 3)?,
                        reference: get_opt_string(&row, 4)?,
                        amount: get_amount(&row, 5, self.units())?,
                        occurred_at: parse_datetime(&row.get::<String>(6)?)?,
                        status,
                        matched_account,
                    });
                }
                matched += 1;
            }
        }
        tx.commit().await?;

        tracing::debug!(
            source = %query.source,
            total_rows = matched,
            page = query.page,
            "category audit scanned legacy rows"
        );

        Ok(CategoryAuditReport {
            range: query.range,
            source: query.source,
            invalid_categories: InvalidCategories {
                transactions: invalid_transactions.into_iter().collect(),
                disbursements: invalid_disbursements.into_iter().collect(),
            },
            rows,
            page: query.page,
            per_page: query.per_page,
            total_rows: matched,
            total_pages: matched.div_ceil(u64::from(query.per_page)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::seeded_service;
    use amanah_core::entities::LegacyRecord;
    use amanah_core::enums::SourceFilter;
    use amanah_core::errors::LedgerError;
    use amanah_core::period::DateRange;
    use chrono::{NaiveDate, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn record(id: &str, day: u32, category: Option<&str>, description: &str) -> LegacyRecord {
        LegacyRecord {
            id: id.into(),
            record_type: "donation".into(),
            category: category.map(String::from),
            description: Some(description.into()),
            reference: Some(format!("INV-{id}")),
            amount: dec!(10000),
            occurred_at: Utc.with_ymd_and_hms(2025, 3, day, 8, 0, 0).unwrap(),
        }
    }

    fn query() -> CategoryAuditQuery {
        CategoryAuditQuery {
            range: DateRange::new(
                NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
            )
            .unwrap(),
            source: SourceFilter::All,
            search: None,
            only_invalid: false,
            page: 1,
            per_page: 20,
        }
    }

    async fn seeded_audit() -> LedgerService {
        let svc = seeded_service().await;
        for r in [
            record("t1", 1, Some("donasi"), "Friday donation"),
            record("t2", 2, Some("sedekah-lama"), "Old alms"),
            record("t3", 3, Some("program"), "Mislabelled"),
            record("t4", 4, None, "No category"),
            record("t5", 5, Some("2010"), "Campaign 50%"),
        ] {
            svc.insert_legacy_record(LegacySource::Transactions, &r)
                .await
                .unwrap();
        }
        for r in [
            record("d1", 6, Some("operasional"), "Electricity"),
            record("d2", 7, Some("renovasi"), "Roof repair"),
            record("d3", 20, Some("renovasi"), "Roof repair, part two"),
        ] {
            svc.insert_legacy_record(LegacySource::Disbursements, &r)
                .await
                .unwrap();
        }
        // Outside the range.
        svc.insert_legacy_record(
            LegacySource::Transactions,
            &LegacyRecord {
                occurred_at: Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap(),
                ..record("t9", 1, Some("zzz"), "April")
            },
        )
        .await
        .unwrap();
        svc
    }

    #[tokio::test]
    async fn reports_distinct_invalid_categories_per_source() {
        let svc = seeded_audit().await;
        let report = svc.audit_categories(&query()).await.unwrap();

        assert_eq!(
            report.invalid_categories,
            InvalidCategories {
                transactions: vec!["program".into(), "sedekah-lama".into()],
                disbursements: vec!["renovasi".into()],
            }
        );
        assert_eq!(report.total_rows, 8);
        assert_eq!(report.total_pages, 1);

        let statuses: Vec<(&str, CategoryStatus)> = report
            .rows
            .iter()
            .map(|row| (row.id.as_str(), row.status))
            .collect();
        assert_eq!(
            statuses,
            vec![
                ("t1", CategoryStatus::Valid),
                ("t2", CategoryStatus::Unknown),
                ("t3", CategoryStatus::TypeMismatch),
                ("t4", CategoryStatus::Missing),
                ("t5", CategoryStatus::Valid),
                ("d1", CategoryStatus::Valid),
                ("d2", CategoryStatus::Unknown),
                ("d3", CategoryStatus::Unknown),
            ]
        );
    }

    #[tokio::test]
    async fn retired_accounts_are_flagged_but_not_invalid() {
        let svc = seeded_audit().await;
        svc.deactivate_account("4100").await.unwrap();
        let report = svc.audit_categories(&query()).await.unwrap();
        assert_eq!(report.rows[0].status, CategoryStatus::Retired);
        assert_eq!(report.rows[0].matched_account.as_deref(), Some("4100"));
        assert!(!report.invalid_categories.transactions.contains(&"donasi".to_string()));
    }

    #[tokio::test]
    async fn source_filter_limits_scan() {
        let svc = seeded_audit().await;
        let report = svc
            .audit_categories(&CategoryAuditQuery {
                source: SourceFilter::Disbursements,
                ..query()
            })
            .await
            .unwrap();
        assert_eq!(report.total_rows, 3);
        assert!(report.invalid_categories.transactions.is_empty());
        assert!(report.rows.iter().all(|row| row.source == LegacySource::Disbursements));
    }

    #[tokio::test]
    async fn search_matches_description_reference_and_category() {
        let svc = seeded_audit().await;
        let search = |needle: &str| CategoryAuditQuery {
            search: Some(needle.into()),
            ..query()
        };

        let report = svc.audit_categories(&search("ROOF")).await.unwrap();
        assert_eq!(report.total_rows, 2);

        let report = svc.audit_categories(&search("inv-t3")).await.unwrap();
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].id, "t3");

        let report = svc.audit_categories(&search("sedekah")).await.unwrap();
        assert_eq!(report.rows[0].id, "t2");

        let report = svc.audit_categories(&search("50%")).await.unwrap();
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].id, "t5");
    }

    #[tokio::test]
    async fn pages_after_filtering_invalid_rows() {
        let svc = seeded_audit().await;
        let invalid_page = |page| CategoryAuditQuery {
            only_invalid: true,
            page,
            per_page: 2,
            ..query()
        };

        let first = svc.audit_categories(&invalid_page(1)).await.unwrap();
        assert_eq!(first.total_rows, 5);
        assert_eq!(first.total_pages, 3);
        let ids: Vec<&str> = first.rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["t2", "t3"]);

        let last = svc.audit_categories(&invalid_page(3)).await.unwrap();
        let ids: Vec<&str> = last.rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["d3"]);

        let beyond = svc.audit_categories(&invalid_page(9)).await.unwrap();
        assert!(beyond.rows.is_empty());
        assert_eq!(beyond.total_rows, 5);
    }

    #[tokio::test]
    async fn oversized_pages_are_rejected() {
        let svc = seeded_audit().await;
        let err = svc
            .audit_categories(&CategoryAuditQuery {
                per_page: 1000,
                ..query()
            })
            .await
            .unwrap_err();
        assert!(matches!(err.ledger(), Some(LedgerError::InvalidFilter(_))));
    }

    #[tokio::test]
    async fn audit_never_writes() {
        let svc = seeded_audit().await;
        let before = svc.trial_balance(None).await.unwrap();
        svc.audit_categories(&query()).await.unwrap();
        assert_eq!(svc.trial_balance(None).await.unwrap(), before);
        assert_eq!(svc.list_entries(&Default::default()).await.unwrap().len(), 0);
    }
}
