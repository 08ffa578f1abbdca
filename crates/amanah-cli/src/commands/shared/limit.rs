/// Page size for paged reads.
///
/// An explicit per-command value is passed through untouched so the service
/// can reject it; the global `--limit` is a convenience and is capped at `max`.
#[must_use]
pub fn page_size(explicit: Option<u32>, global: Option<u32>, default: u32, max: u32) -> u32 {
    match (explicit, global) {
        (Some(value), _) => value,
        (None, Some(value)) => value.min(max),
        (None, None) => default,
    }
}
