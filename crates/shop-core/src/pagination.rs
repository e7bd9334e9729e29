//! # Pagination
//!
//! Page math for listing views: item ranges, "showing X–Y of Z" numbers and
//! the page-link window with gaps.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// One entry in a pagination control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageLink {
    Page(usize),
    Gap,
}

/// Resolved pagination for a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Current page (1-based, always within `1..=total_pages`)
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl Pagination {
    /// Resolve a requested page. `per_page` is at least 1 and the page is
    /// clamped into range; an empty listing still has one (empty) page.
    pub fn new(page: usize, per_page: usize, total_items: usize) -> Self {
        let per_page = per_page.max(1);
        let total_pages = total_items.div_ceil(per_page).max(1);
        Self {
            page: page.clamp(1, total_pages),
            per_page,
            total_items,
            total_pages,
        }
    }

    /// Index of the first item on this page
    pub fn offset(&self) -> usize {
        (self.page - 1) * self.per_page
    }

    /// Index range of the items on this page
    pub fn range(&self) -> Range<usize> {
        let start = self.offset().min(self.total_items);
        let end = (start + self.per_page).min(self.total_items);
        start..end
    }

    /// 1-based number of the first item shown, `0` when empty
    pub fn first_item(&self) -> usize {
        if self.total_items == 0 {
            0
        } else {
            self.offset() + 1
        }
    }

    /// 1-based number of the last item shown, `0` when empty
    pub fn last_item(&self) -> usize {
        self.range().end
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Items belonging to this page
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let range = self.range();
        &items[range.start.min(items.len())..range.end.min(items.len())]
    }

    /// Page links around the current page.
    ///
    /// The first and last pages are always present, pages within `radius` of
    /// the current one are shown, and every other run collapses into a `Gap`.
    /// A gap that would hide a single page shows that page instead.
    pub fn window(&self, radius: usize) -> Vec<PageLink> {
        let lo = self.page.saturating_sub(radius).max(1);
        let hi = (self.page + radius).min(self.total_pages);

        let mut links = Vec::new();
        if lo > 1 {
            links.push(PageLink::Page(1));
            match lo {
                2 => {}
                3 => links.push(PageLink::Page(2)),
                _ => links.push(PageLink::Gap),
            }
        }
        links.extend((lo..=hi).map(PageLink::Page));
        if hi < self.total_pages {
            match self.total_pages - hi {
                1 => {}
                2 => links.push(PageLink::Page(hi + 1)),
                _ => links.push(PageLink::Gap),
            }
            links.push(PageLink::Page(self.total_pages));
        }
        links
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PageLink::{Gap, Page};

    #[test]
    fn test_basic_math() {
        let p = Pagination::new(2, 10, 45);
        assert_eq!(p.total_pages, 5);
        assert_eq!(p.offset(), 10);
        assert_eq!(p.range(), 10..20);
        assert_eq!((p.first_item(), p.last_item()), (11, 20));
        assert!(p.has_previous());
        assert!(p.has_next());
    }

    #[test]
    fn test_last_page_is_partial() {
        let p = Pagination::new(5, 10, 45);
        assert_eq!(p.range(), 40..45);
        assert_eq!((p.first_item(), p.last_item()), (41, 45));
        assert!(!p.has_next());
    }

    #[test]
    fn test_clamping() {
        assert_eq!(Pagination::new(0, 10, 45).page, 1);
        assert_eq!(Pagination::new(99, 10, 45).page, 5);
        assert_eq!(Pagination::new(1, 0, 3).per_page, 1);
    }

    #[test]
    fn test_empty_listing() {
        let p = Pagination::new(3, 12, 0);
        assert_eq!(p.total_pages, 1);
        assert_eq!(p.page, 1);
        assert_eq!(p.range(), 0..0);
        assert_eq!((p.first_item(), p.last_item()), (0, 0));
        assert!(!p.has_previous() && !p.has_next());
    }

    #[test]
    fn test_slice() {
        let items: Vec<u32> = (1..=7).collect();
        assert_eq!(Pagination::new(2, 3, items.len()).slice(&items), &[4, 5, 6]);
        assert_eq!(Pagination::new(3, 3, items.len()).slice(&items), &[7]);
    }

    #[test]
    fn test_window_with_gaps() {
        let p = Pagination::new(10, 10, 200);
        assert_eq!(
            p.window(1),
            vec![Page(1), Gap, Page(9), Page(10), Page(11), Gap, Page(20)]
        );
    }

    #[test]
    fn test_window_near_edges() {
        assert_eq!(
            Pagination::new(1, 10, 100).window(1),
            vec![Page(1), Page(2), Gap, Page(10)]
        );
        assert_eq!(
            Pagination::new(3, 10, 50).window(1),
            vec![Page(1), Page(2), Page(3), Page(4), Page(5)]
        );
        assert_eq!(Pagination::new(1, 10, 5).window(2), vec![Page(1)]);
    }
}
