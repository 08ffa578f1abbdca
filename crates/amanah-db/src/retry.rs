//! Busy-lock retry logic for the write path.
//!
//! Another process holding the `SQLite` write lock longer than
//! `busy_timeout` surfaces as "database is locked". Those errors resolve on
//! their own once the other writer commits, so posting retries them with
//! capped exponential backoff. Nothing else is retried.

use std::future::Future;
use std::time::Duration;

use amanah_config::RetrySettings;

use crate::error::DatabaseError;

/// Configuration for retry behavior on lock contention.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial one).
    pub max_attempts: u32,
    /// Initial delay before the first retry.
    pub base_delay: Duration,
    /// Maximum delay between retries (backoff is capped here).
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::from(&RetrySettings::default())
    }
}

impl From<&RetrySettings> for RetryConfig {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            base_delay: settings.base_delay(),
            max_delay: settings.max_delay(),
        }
    }
}

/// Detect lock-contention errors.
///
/// The predicate is intentionally narrow to avoid retrying genuine
/// SQL or constraint errors.
#[must_use]
pub fn is_busy_error(e: &DatabaseError) -> bool {
    let DatabaseError::LibSql(inner) = e else {
        return false;
    };
    let msg = inner.to_string().to_ascii_lowercase();
    msg.contains("database is locked")
        || msg.contains("database table is locked")
        || msg.contains("sqlite_busy")
}

/// Run `op` until it succeeds, fails with a non-busy error, or runs out of attempts.
///
/// # Errors
///
/// Returns the last error from `op`.
pub async fn with_retry<T, F, Fut>(
    config: &RetryConfig,
    what: &str,
    mut op: F,
) -> Result<T, DatabaseError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DatabaseError>>,
{
    let mut delay = config.base_delay;
    let mut attempt = 1;
    loop {
        match op().await {
            Err(e) if is_busy_error(&e) && attempt < config.max_attempts => {
                tracing::debug!(
                    "{what}: database busy (attempt {attempt}/{}), retrying in {delay:?}: {e}",
                    config.max_attempts
                );
                tokio::time::sleep(delay).await;
                delay = std::cmp::min(delay * 2, config.max_delay);
                attempt += 1;
            }
            result => return result,
        }
    }
}
