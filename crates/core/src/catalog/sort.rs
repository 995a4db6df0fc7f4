//! In-memory ordering by the derived artist attribute.

use std::cmp::Ordering;

use super::Manga;
use crate::store::SortDirection;

/// Sort by each item's first artist. Items without an artist go last in
/// either direction; the sort is stable.
pub fn sort_by_first_artist(items: &mut [Manga], direction: SortDirection) {
    items.sort_by(|a, b| match (a.first_artist(), b.first_artist()) {
        (Some(x), Some(y)) => {
            let ordering = compare_names(x, y);
            match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Case-folded comparison, ties broken by the raw text.
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
