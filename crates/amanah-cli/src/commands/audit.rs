use amanah_core::audit::CategoryAuditQuery;
use amanah_core::enums::SourceFilter;
use amanah_core::period::DateRange;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::AuditArgs;
use crate::commands::shared::limit::page_size;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `amanah audit`.
pub async fn handle(args: &AuditArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let audit = &ctx.service.config().audit;
    let query = build_query(args, flags.limit, audit.default_per_page, audit.max_per_page)?;
    let report = ctx.service.audit_categories(&query).await?;
    output(&report, flags.format)
}

fn build_query(
    args: &AuditArgs,
    global_limit: Option<u32>,
    default_per_page: u32,
    max_per_page: u32,
) -> anyhow::Result<CategoryAuditQuery> {
    let source: SourceFilter = parse_enum(&args.source, "source")?;
    Ok(CategoryAuditQuery {
        range: DateRange::new(args.start, args.end)?,
        source,
        search: args.search.clone(),
        only_invalid: args.only_invalid,
        page: args.page,
        per_page: page_size(args.per_page, global_limit, default_per_page, max_per_page),
    })
}
