use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(id: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let prefix = &ctx.service.config().ledger.entry_number_prefix;
    let entry = if is_entry_number(id, prefix) {
        ctx.service.get_entry_by_number(id).await?
    } else {
        ctx.service.get_entry(id).await?
    };
    output(&entry, flags.format)
}

/// Entry numbers look like `{prefix}-YYYYMM-NNNNNN`; anything else is an ID.
fn is_entry_number(raw: &str, prefix: &str) -> bool {
    let Some(rest) = raw.strip_prefix(prefix).and_then(|r| r.strip_prefix('-')) else {
        return false;
    };
    let mut parts = rest.split('-');
    matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(period), Some(seq), None)
            if period.len() == 6
                && period.bytes().all(|b| b.is_ascii_digit())
                && !seq.is_empty()
                && seq.bytes().all(|b| b.is_ascii_digit())
    )
}
