use amanah_core::entities::NewAccount;
use amanah_core::enums::{AccountType, NormalBalance};

use crate::cli::GlobalFlags;
use crate::commands::shared::parse::{parse_enum, parse_opt_enum};
use crate::context::AppContext;
use crate::output::output;

#[allow(clippy::too_many_arguments)]
pub async fn run(
    code: &str,
    name: &str,
    account_type: &str,
    normal_balance: Option<&str>,
    category: Option<&str>,
    parent: Option<&str>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let account_type: AccountType = parse_enum(account_type, "account type")?;
    let normal_balance: NormalBalance = parse_opt_enum(normal_balance, "normal balance")?
        .unwrap_or_else(|| account_type.normal_balance());

    let new = NewAccount {
        code: code.trim().to_string(),
        name: name.trim().to_string(),
        account_type,
        normal_balance,
        category: category.map(String::from),
        parent_code: parent.map(String::from),
    };
    let account = ctx.service.create_account(&new).await?;
    output(&account, flags.format)
}
