//! Page window over an ordered list.
//!
//! `current_page` is 1-based and always satisfies
//! `1 <= current_page <= max(1, ceil(total_items / page_size))`. Every
//! mutation re-clamps; out-of-range page numbers are never an error.

use crate::error::PaginationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(usize),
    Ellipsis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    current_page: usize,
    page_size: usize,
    total_items: usize,
}

impl Pagination {
    pub fn new(page_size: usize, total_items: usize) -> Result<Self, PaginationError> {
        if page_size == 0 {
            return Err(PaginationError::ZeroPageSize);
        }
        Ok(Self {
            current_page: 1,
            page_size,
            total_items,
        })
    }

    /// For server-paginated sources, where the total comes from the response
    /// rather than the length of a local list.
    pub fn with_external_total(page_size: usize, total_items: i64) -> Result<Self, PaginationError> {
        let total = usize::try_from(total_items).map_err(|_| PaginationError::NegativeTotal(total_items))?;
        Self::new(page_size, total)
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.total_items, self.page_size)
    }

    /// The items of the current page.
    pub fn slice<'a, T>(&self, list: &'a [T]) -> &'a [T] {
        page_slice(list, self.current_page as i64, self.page_size)
    }

    /// Sets the current page, clamped into range. Returns the page landed on.
    pub fn go_to_page(&mut self, target: i64) -> usize {
        let last = self.total_pages() as i64;
        self.current_page = target.clamp(1, last) as usize;
        self.current_page
    }

    pub fn next_page(&mut self) -> bool {
        self.step_to(self.current_page as i64 + 1)
    }

    pub fn prev_page(&mut self) -> bool {
        self.step_to(self.current_page as i64 - 1)
    }

    pub fn first_page(&mut self) -> bool {
        self.step_to(1)
    }

    pub fn last_page(&mut self) -> bool {
        self.step_to(self.total_pages() as i64)
    }

    fn step_to(&mut self, target: i64) -> bool {
        let before = self.current_page;
        self.go_to_page(target) != before
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages()
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    /// Changes the page size, keeping the first item of the current page
    /// visible.
    pub fn change_page_size(&mut self, page_size: usize) -> Result<(), PaginationError> {
        if page_size == 0 {
            return Err(PaginationError::ZeroPageSize);
        }
        let first_index = (self.current_page - 1) * self.page_size;
        self.page_size = page_size;
        self.go_to_page((first_index / page_size + 1) as i64);
        Ok(())
    }

    /// Called when the underlying list changes length.
    pub fn set_total_items(&mut self, total_items: usize) {
        self.total_items = total_items;
        self.go_to_page(self.current_page as i64);
    }

    pub fn set_external_total(&mut self, total_items: i64) -> Result<(), PaginationError> {
        let total = usize::try_from(total_items).map_err(|_| PaginationError::NegativeTotal(total_items))?;
        self.set_total_items(total);
        Ok(())
    }

    /// 1-based index of the first and last item on the current page, or
    /// `None` for an empty list.
    pub fn range(&self) -> Option<(usize, usize)> {
        if self.total_items == 0 {
            return None;
        }
        let start = (self.current_page - 1) * self.page_size + 1;
        let end = (self.current_page * self.page_size).min(self.total_items);
        Some((start, end))
    }

    /// Condensed page bar: first and last page, a window of
    /// `max_pages_to_show` pages around the current one, and ellipses for
    /// the gaps.
    pub fn page_numbers(&self, max_pages_to_show: usize) -> Vec<PageItem> {
        let total = self.total_pages();
        let window = max_pages_to_show.max(1);

        if total <= window {
            return (1..=total).map(PageItem::Page).collect();
        }

        let start = self
            .current_page
            .saturating_sub(window / 2)
            .clamp(1, total - window + 1);
        let end = start + window - 1;

        let mut pages = Vec::with_capacity(window + 4);
        if start > 1 {
            pages.push(PageItem::Page(1));
            if start > 2 {
                pages.push(PageItem::Ellipsis);
            }
        }
        pages.extend((start..=end).map(PageItem::Page));
        if end < total {
            if end < total - 1 {
                pages.push(PageItem::Ellipsis);
            }
            pages.push(PageItem::Page(total));
        }
        pages
    }
}

pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    total_items.div_ceil(page_size).max(1)
}

/// Items of page `page` (1-based). Any page number is accepted and clamped;
/// a zero page size yields an empty slice.
pub fn page_slice<T>(list: &[T], page: i64, page_size: usize) -> &[T] {
    if page_size == 0 || list.is_empty() {
        return &[];
    }
    let last = total_pages(list.len(), page_size) as i64;
    let page = page.clamp(1, last) as usize;
    let start = (page - 1) * page_size;
    let end = start.saturating_add(page_size).min(list.len());
    &list[start..end]
}
