use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(code: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let account = ctx.service.deactivate_account(code).await?;
    output(&account, flags.format)
}
