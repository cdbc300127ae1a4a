//! Pagination utilities
//!
//! Ranked results are served in fixed pages of 100 entries, 1-indexed.
//! A page past the end is empty rather than an error.

use std::ops::Range;

/// Page size constant for all pagination
pub const PAGE_SIZE: usize = 100;

/// Offsets covered by `page` of a list of `total` entries
///
/// # Examples
/// ```
/// use ciframe_api::pagination::page_bounds;
///
/// // 250 results = 3 pages (100 + 100 + 50)
/// assert_eq!(page_bounds(250, 2), 100..200);
/// assert_eq!(page_bounds(250, 3), 200..250);
///
/// // Out-of-range page is empty
/// assert!(page_bounds(250, 9).is_empty());
/// ```
pub fn page_bounds(total: usize, page: usize) -> Range<usize> {
    let page = page.max(1);
    let start = (page - 1).saturating_mul(PAGE_SIZE).min(total);
    let end = start.saturating_add(PAGE_SIZE).min(total);
    start..end
}

/// Slice one page out of a ranked list
pub fn paginate<T>(items: &[T], page: usize) -> &[T] {
    &items[page_bounds(items.len(), page)]
}

/// Parse the `pagina` query parameter
///
/// Absent or empty means page 1; anything that is not a positive integer
/// is rejected.
pub fn parse_page(raw: Option<&str>) -> Result<usize, String> {
    match raw {
        None => Ok(1),
        Some(value) if value.trim().is_empty() => Ok(1),
        Some(value) => match value.trim().parse::<usize>() {
            Ok(page) if page >= 1 => Ok(page),
            _ => Err(value.to_string()),
        },
    }
}
