//! Page arithmetic shared by every paginated list.

use crate::error::AppError;
use serde_json::json;

/// Which page of a list the client asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequest {
    /// 1-indexed page number.
    Number(u32),
    /// The last page, whatever its number.
    Last,
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::Number(1)
    }
}

/// Offset/limit window for one page, resolved against a total count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u32,
    pub num_pages: u32,
    pub offset: i64,
    pub limit: i64,
}

impl PageWindow {
    /// Resolves a page request against the total number of items.
    ///
    /// An empty list still has one (empty) page.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for page 0 or a page past the end.
    pub fn resolve(request: PageRequest, count: i64, per_page: u32) -> Result<Self, AppError> {
        let per_page = per_page.max(1);
        let count = count.max(0) as u64;
        let num_pages = count.div_ceil(u64::from(per_page)).max(1) as u32;

        let number = match request {
            PageRequest::Last => num_pages,
            PageRequest::Number(n) if n >= 1 && n <= num_pages => n,
            PageRequest::Number(n) => {
                return Err(AppError::not_found(
                    "Invalid page",
                    json!({ "page": n, "num_pages": num_pages }),
                ));
            }
        };

        Ok(Self {
            number,
            num_pages,
            offset: i64::from(number - 1) * i64::from(per_page),
            limit: i64::from(per_page),
        })
    }
}

/// One page of results plus the navigation data templates need.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u32,
    pub num_pages: u32,
    pub count: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, window: PageWindow, count: i64) -> Self {
        Self {
            items,
            number: window.number,
            num_pages: window.num_pages,
            count,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_other_pages(&self) -> bool {
        self.num_pages > 1
    }

    pub fn previous_page_number(&self) -> u32 {
        self.number.saturating_sub(1).max(1)
    }

    pub fn next_page_number(&self) -> u32 {
        (self.number + 1).min(self.num_pages)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
