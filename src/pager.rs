/// Page count reported while the display list is empty, so the controls stay
/// usable before the first load.
pub const DEFAULT_MAX_PAGE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequest {
    Prev,
    Next,
    Jump(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView<'a, T> {
    pub page: usize,
    pub start: usize,
    pub items: &'a [T],
    pub has_more: bool,
    pub max_page: usize,
}

pub fn max_page(len: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    if len == 0 {
        DEFAULT_MAX_PAGE
    } else {
        len.div_ceil(page_size)
    }
}

/// Slices `list` for a 1-based page, clamping the page into `[1, max_page]`.
pub fn page<T>(list: &[T], page_number: usize, page_size: usize) -> PageView<'_, T> {
    let page_size = page_size.max(1);
    let max_page = max_page(list.len(), page_size);
    let page = page_number.clamp(1, max_page);
    let start = ((page - 1) * page_size).min(list.len());
    let end = (start + page_size).min(list.len());
    PageView {
        page,
        start,
        items: &list[start..end],
        has_more: end < list.len(),
        max_page,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page: usize,
    page_size: usize,
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }

    /// Applies a navigation request against a list of `len` items.
    /// Out-of-range targets leave the page unchanged; returns whether it moved.
    pub fn change(&mut self, request: PageRequest, len: usize) -> bool {
        let target = match request {
            PageRequest::Prev => match self.page.checked_sub(1) {
                Some(p) => p,
                None => return false,
            },
            PageRequest::Next => self.page + 1,
            PageRequest::Jump(p) => p,
        };
        if target == 0 || target > max_page(len, self.page_size) || target == self.page {
            return false;
        }
        self.page = target;
        true
    }

    /// Pulls the page back inside the bounds after the list shrank.
    pub fn clamp(&mut self, len: usize) {
        self.page = self.page.clamp(1, max_page(len, self.page_size));
    }

    pub fn view<'a, T>(&self, list: &'a [T]) -> PageView<'a, T> {
        page(list, self.page, self.page_size)
    }
}
