use amanah_config::AmanahConfig;
use amanah_db::service::LedgerService;
use anyhow::Context;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub service: LedgerService,
}

impl AppContext {
    /// Open the configured ledger database and build the service.
    pub async fn init(config: AmanahConfig) -> anyhow::Result<Self> {
        tracing::debug!(path = %config.database.path, "opening ledger database");
        let service = LedgerService::new_local(&config)
            .await
            .with_context(|| format!("failed to open ledger at {}", config.database.path))?;
        Ok(Self { service })
    }
}

#[cfg(test)]
mod tests {
    use amanah_config::AmanahConfig;
    use amanah_core::entities::NewAccount;
    use amanah_core::enums::AccountType;

    use super::AppContext;

    #[tokio::test]
    async fn init_creates_ledger_under_missing_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("books").join("ledger.db");
        let mut config = AmanahConfig::default();
        config.database.path = path.to_string_lossy().into_owned();

        let ctx = AppContext::init(config.clone()).await.unwrap();
        ctx.service
            .create_account(&NewAccount::new("1020", "Bank", AccountType::Asset))
            .await
            .unwrap();
        drop(ctx);

        assert!(path.exists());
        let reopened = AppContext::init(config).await.unwrap();
        let account = reopened.service.resolve_account("1020").await.unwrap();
        assert_eq!(account.name, "Bank");
    }

    #[tokio::test]
    async fn init_rejects_invalid_config() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = AmanahConfig::default();
        config.database.path = dir.path().join("ledger.db").to_string_lossy().into_owned();
        config.migration.batch_size = 0;

        let err = AppContext::init(config).await.err().expect("invalid config should fail");
        assert!(format!("{err:#}").contains("batch_size"));
    }
}
