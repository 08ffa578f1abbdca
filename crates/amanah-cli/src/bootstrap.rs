use amanah_config::AmanahConfig;
use anyhow::Context;

use crate::cli::GlobalFlags;

/// Load layered configuration (`.env`, TOML files, `AMANAH_*`) and apply CLI overrides.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<AmanahConfig> {
    let config =
        AmanahConfig::load_with_dotenv().context("failed to load amanah configuration")?;
    Ok(apply_overrides(config, flags))
}

fn apply_overrides(mut config: AmanahConfig, flags: &GlobalFlags) -> AmanahConfig {
    if let Some(path) = &flags.db {
        config.database.path.clone_from(path);
    }
    config
}
