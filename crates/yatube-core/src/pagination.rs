//! Page-number pagination over ordered collections.
//!
//! Out-of-range requests never fail: anything that is not an integer lands on
//! the first page, while numbers below one and numbers past the end land on
//! the last one.

use std::fmt;

use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Splits a collection of known size into fixed-size pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    per_page: u64,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

/// Where one page sits inside the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u64,
    pub num_pages: u64,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

impl Paginator {
    pub fn new(per_page: u64) -> Self {
        Self {
            per_page: per_page.max(1),
        }
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    /// Number of pages for `total` items. An empty collection still has one
    /// (empty) page.
    pub fn num_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.per_page).max(1)
    }

    /// Resolve the raw `?page=` value into a window over `total` items.
    pub fn window(&self, total: u64, requested: Option<&str>) -> PageWindow {
        let num_pages = self.num_pages(total);
        let number = PageRequest::parse(requested).resolve(num_pages);

        PageWindow {
            number,
            num_pages,
            total,
            offset: (number - 1) * self.per_page,
            limit: self.per_page,
        }
    }

    /// Slice an in-memory collection.
    pub fn page<T: Clone>(&self, items: &[T], requested: Option<&str>) -> Page<T> {
        let window = self.window(items.len() as u64, requested);
        let start = (window.offset as usize).min(items.len());
        let end = (start + window.limit as usize).min(items.len());
        Page::new(items[start..end].to_vec(), window)
    }
}

/// A `?page=` value before the collection size is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequest {
    Number(u64),
    /// Zero or negative: always the last page.
    Last,
}

impl PageRequest {
    /// Only integers count as page numbers; "2.0", "abc" or a missing value
    /// are page 1.
    pub fn parse(requested: Option<&str>) -> Self {
        match requested.map(str::trim).and_then(|raw| raw.parse::<i64>().ok()) {
            Some(n) if n >= 1 => Self::Number(n as u64),
            Some(_) => Self::Last,
            None => Self::Number(1),
        }
    }

    pub fn resolve(self, num_pages: u64) -> u64 {
        match self {
            Self::Number(n) => n.min(num_pages),
            Self::Last => num_pages,
        }
    }
}

impl fmt::Display for PageRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Last => f.write_str("last"),
        }
    }
}

/// One page of results plus the navigation numbers templates need.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, window: PageWindow) -> Self {
        Self {
            items,
            number: window.number,
            num_pages: window.num_pages,
            total: window.total,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn previous_page_number(&self) -> Option<u64> {
        self.has_previous().then(|| self.number - 1)
    }

    pub fn next_page_number(&self) -> Option<u64> {
        self.has_next().then(|| self.number + 1)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            total: self.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(n: u64) -> Vec<u64> {
        (1..=n).collect()
    }

    #[test]
    fn test_thirteen_items_split_ten_and_three() {
        let paginator = Paginator::default();
        let all = items(13);

        let first = paginator.page(&all, None);
        assert_eq!(first.len(), 10);
        assert_eq!(first.num_pages, 2);
        assert!(first.has_next());
        assert!(!first.has_previous());

        let second = paginator.page(&all, Some("2"));
        assert_eq!(second.items, vec![11, 12, 13]);
        assert_eq!(second.previous_page_number(), Some(1));
        assert_eq!(second.next_page_number(), None);
    }

    #[test]
    fn test_non_integer_page_falls_back_to_first() {
        let paginator = Paginator::new(5);
        let all = items(12);

        for raw in ["abc", "", "1.5", "2.0", "NaN"] {
            assert_eq!(paginator.page(&all, Some(raw)).number, 1, "page={raw:?}");
        }
        assert_eq!(paginator.page(&all, None).number, 1);
    }

    #[test]
    fn test_page_below_one_falls_back_to_last() {
        let paginator = Paginator::default();
        let all = items(13);

        for raw in ["0", "-1", "-3"] {
            let page = paginator.page(&all, Some(raw));
            assert_eq!(page.number, 2, "page={raw:?}");
            assert_eq!(page.items, vec![11, 12, 13]);
        }
    }

    #[test]
    fn test_out_of_range_page_falls_back_to_last() {
        let paginator = Paginator::new(5);
        let page = paginator.page(&items(12), Some("99"));

        assert_eq!(page.number, 3);
        assert_eq!(page.items, vec![11, 12]);
    }

    #[test]
    fn test_page_request_parse() {
        assert_eq!(PageRequest::parse(Some(" 3 ")), PageRequest::Number(3));
        assert_eq!(PageRequest::parse(Some("+2")), PageRequest::Number(2));
        assert_eq!(PageRequest::parse(Some("0")), PageRequest::Last);
        assert_eq!(PageRequest::parse(Some("2.0")), PageRequest::Number(1));
        assert_eq!(PageRequest::Last.to_string(), "last");
    }

    #[test]
    fn test_empty_collection_has_one_page() {
        let paginator = Paginator::default();
        let page = paginator.page::<u64>(&[], Some("4"));

        assert_eq!(page.number, 1);
        assert_eq!(page.num_pages, 1);
        assert!(page.is_empty());
    }

    #[test]
    fn test_window_offsets() {
        let paginator = Paginator::new(10);
        let window = paginator.window(25, Some("3"));

        assert_eq!(window.offset, 20);
        assert_eq!(window.limit, 10);
        assert_eq!(window.num_pages, 3);
    }

    #[test]
    fn test_zero_page_size_is_clamped() {
        assert_eq!(Paginator::new(0).per_page(), 1);
    }
}
