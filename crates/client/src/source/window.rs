//! Client-side paging over a non-paginated list.

/// Slice page `page` of `page_size` items out of `items`.
///
/// Windows are `[page * page_size, page * page_size + page_size)`, so
/// consecutive pages never overlap. Out-of-range pages are empty.
#[must_use]
pub fn page_window<T: Clone>(items: &[T], page: usize, page_size: usize) -> Vec<T> {
    let Some(start) = page.checked_mul(page_size) else {
        return Vec::new();
    };
    items
        .iter()
        .skip(start)
        .take(page_size)
        .cloned()
        .collect()
}
