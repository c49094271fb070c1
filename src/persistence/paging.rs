//! Offset paging for list queries.
//!
//! Repositories count the matching rows first, clamp the requested page to
//! the last one and only then fetch, so a page past the end shows the last
//! page instead of an empty one.

/// A 1-based page number and a page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    number: usize,
    per_page: usize,
}

impl PageRequest {
    /// Builds a request; zero values become one.
    #[must_use]
    pub fn new(number: usize, per_page: usize) -> Self {
        Self {
            number: number.max(1),
            per_page: per_page.max(1),
        }
    }

    /// The first `per_page` rows.
    #[must_use]
    pub fn first(per_page: usize) -> Self {
        Self::new(1, per_page)
    }

    /// Parses a `?page=` value; missing or malformed means the first page.
    #[must_use]
    pub fn parse(requested: Option<&str>, per_page: usize) -> Self {
        let number = requested
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .unwrap_or(1);
        Self::new(number, per_page)
    }

    /// 1-based page number.
    #[must_use]
    pub const fn number(self) -> usize {
        self.number
    }

    /// Rows per page.
    #[must_use]
    pub const fn per_page(self) -> usize {
        self.per_page
    }

    /// Rows skipped before this page.
    #[must_use]
    pub const fn offset(self) -> usize {
        (self.number - 1) * self.per_page
    }

    /// Pages needed for `total` rows, at least one.
    #[must_use]
    pub const fn num_pages(self, total: usize) -> usize {
        let pages = total.div_ceil(self.per_page);
        if pages == 0 { 1 } else { pages }
    }

    /// Moves a request past the end onto the last page.
    #[must_use]
    pub fn clamp_to(self, total: usize) -> Self {
        Self {
            number: self.number.min(self.num_pages(total)),
            per_page: self.per_page,
        }
    }

    /// `offset` and `limit` as SQL parameters.
    pub(crate) fn sql_window(self) -> (i64, i64) {
        let offset = i64::try_from(self.offset()).unwrap_or(i64::MAX);
        let limit = i64::try_from(self.per_page).unwrap_or(i64::MAX);
        (offset, limit)
    }
}

/// One page of rows plus the count across all pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paged<T> {
    /// Rows on this page.
    pub items: Vec<T>,
    /// Rows matching the query across all pages.
    pub total: usize,
    /// The page actually served, after clamping.
    pub request: PageRequest,
}

impl<T> Paged<T> {
    /// Slices rows already held in memory.
    #[must_use]
    pub fn slice(rows: Vec<T>, request: PageRequest) -> Self {
        let total = rows.len();
        let request = request.clamp_to(total);
        let items = rows
            .into_iter()
            .skip(request.offset())
            .take(request.per_page())
            .collect();
        Self {
            items,
            total,
            request,
        }
    }

    /// Transforms the rows on this page.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paged<U> {
        Paged {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            request: self.request,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PageRequest, Paged};
    use rstest::rstest;

    #[rstest]
    #[case(0, 1)]
    #[case(7, 3)]
    #[case(9, 3)]
    #[case(10, 4)]
    fn page_count_never_drops_below_one(#[case] total: usize, #[case] pages: usize) {
        assert_eq!(PageRequest::first(3).num_pages(total), pages);
    }

    #[test]
    fn requests_past_the_end_land_on_the_last_page() {
        let request = PageRequest::new(40, 10).clamp_to(25);
        assert_eq!(request.number(), 3);
        assert_eq!(request.offset(), 20);
        assert_eq!(request.sql_window(), (20, 10));
    }

    #[test]
    fn slicing_reports_the_full_total() {
        let paged = Paged::slice((1..=7).collect::<Vec<i32>>(), PageRequest::new(3, 3));
        assert_eq!(paged.items, vec![7]);
        assert_eq!(paged.total, 7);
        assert_eq!(paged.request.number(), 3);
    }
}
