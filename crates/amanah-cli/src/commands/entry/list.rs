use amanah_db::repos::entries::EntryFilter;

use crate::cli::GlobalFlags;
use crate::commands::shared::parse::parse_opt_enum;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(
    ref_type: Option<&str>,
    ref_id: Option<&str>,
    period: Option<&str>,
    status: Option<&str>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let filter = EntryFilter {
        ref_type: parse_opt_enum(ref_type, "ref type")?,
        ref_id: ref_id.map(String::from),
        period: period.map(String::from),
        status: parse_opt_enum(status, "status")?,
        limit: flags.limit,
    };
    let entries = ctx.service.list_entries(&filter).await?;
    output(&entries, flags.format)
}
