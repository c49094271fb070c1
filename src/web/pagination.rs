//! Page navigation data for list views.

use crate::persistence::{PageRequest, Paged};
use serde::Serialize;

/// Tasks per page.
pub const TASKS_PER_PAGE: usize = 10;
/// Notifications per page.
pub const NOTIFICATIONS_PER_PAGE: usize = 15;
/// Audit rows per page.
pub const ACTIVITY_PER_PAGE: usize = 25;
/// Workers per page.
pub const WORKERS_PER_PAGE: usize = 20;
/// Projects, teams and tags per page.
pub const CATALOG_PER_PAGE: usize = 10;

/// One page of a list plus navigation data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// 1-based page number.
    pub number: usize,
    /// Total pages, at least 1.
    pub num_pages: usize,
    /// Items across all pages.
    pub total: usize,
    /// Previous page number.
    pub previous: Option<usize>,
    /// Next page number.
    pub next: Option<usize>,
}

impl<T> Page<T> {
    /// Slices rows already held in memory to the requested page.
    ///
    /// A missing or malformed page number means the first page; a number
    /// past the end means the last page.
    #[must_use]
    pub fn of(items: Vec<T>, requested: Option<&str>, per_page: usize) -> Self {
        Paged::slice(items, PageRequest::parse(requested, per_page)).into()
    }

    /// Transforms the items on this page.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            total: self.total,
            previous: self.previous,
            next: self.next,
        }
    }
}

impl<T> From<Paged<T>> for Page<T> {
    fn from(paged: Paged<T>) -> Self {
        let number = paged.request.number();
        let num_pages = paged.request.num_pages(paged.total);
        Self {
            items: paged.items,
            number,
            num_pages,
            total: paged.total,
            previous: (number > 1).then(|| number - 1),
            next: (number < num_pages).then(|| number + 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Page;
    use crate::persistence::{PageRequest, Paged};
    use rstest::rstest;

    #[rstest]
    #[case(None, 1, vec![1, 2, 3])]
    #[case(Some("2"), 2, vec![4, 5, 6])]
    #[case(Some("99"), 3, vec![7])]
    #[case(Some("zero"), 1, vec![1, 2, 3])]
    #[case(Some("0"), 1, vec![1, 2, 3])]
    fn pages_are_clamped(
        #[case] requested: Option<&str>,
        #[case] number: usize,
        #[case] items: Vec<i32>,
    ) {
        let page = Page::of((1..=7).collect(), requested, 3);
        assert_eq!(page.number, number);
        assert_eq!(page.items, items);
        assert_eq!(page.num_pages, 3);
        assert_eq!(page.total, 7);
    }

    #[test]
    fn empty_lists_have_one_page() {
        let page: Page<i32> = Page::of(Vec::new(), Some("4"), 10);
        assert_eq!((page.number, page.num_pages), (1, 1));
        assert_eq!((page.previous, page.next), (None, None));
    }

    #[test]
    fn pages_fetched_by_the_store_keep_its_total() {
        let paged = Paged {
            items: vec!["k", "l"],
            total: 12,
            request: PageRequest::new(2, 10),
        };
        let page = Page::from(paged);
        assert_eq!((page.number, page.num_pages, page.total), (2, 2, 12));
        assert_eq!((page.previous, page.next), (Some(1), None));
    }
}
