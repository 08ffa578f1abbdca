//! Category audit paging limits.

use serde::{Deserialize, Serialize};

const fn default_per_page() -> u32 {
    20
}

const fn default_max_per_page() -> u32 {
    100
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuditConfig {
    #[serde(default = "default_per_page")]
    pub default_per_page: u32,

    /// Hard cap on rows returned per page.
    #[serde(default = "default_max_per_page")]
    pub max_per_page: u32,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            default_per_page: default_per_page(),
            max_per_page: default_max_per_page(),
        }
    }
}
