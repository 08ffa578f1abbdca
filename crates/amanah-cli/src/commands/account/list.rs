use amanah_db::repos::accounts::AccountFilter;

use crate::cli::GlobalFlags;
use crate::commands::shared::parse::parse_opt_enum;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(
    account_type: Option<&str>,
    active: Option<bool>,
    parent: Option<&str>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let filter = AccountFilter {
        account_type: parse_opt_enum(account_type, "account type")?,
        active,
        parent_code: parent.map(String::from),
    };
    let mut accounts = ctx.service.list_accounts(&filter).await?;
    if let Some(limit) = flags.limit {
        accounts.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
    }
    output(&accounts, flags.format)
}
