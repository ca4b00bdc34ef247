//! Pagination types for ledger and catalog listings.

use serde::{Deserialize, Serialize};

/// Default page size.
const DEFAULT_PAGE_SIZE: u64 = 25;
/// Maximum page size.
const MAX_PAGE_SIZE: u64 = 100;

/// Request parameters for paginated queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-based).
    #[serde(default = "default_page")]
    pub page: u64,
    /// Number of items per page.
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

impl PageRequest {
    /// Create a new page request.
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Calculate the SQL `OFFSET` value. Saturates for absurd page numbers.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit())
    }

    /// Slice an already-ordered collection down to this page.
    pub fn slice<T: Serialize>(&self, items: Vec<T>) -> PageResponse<T> {
        let total = items.len() as u64;
        let page_items = items
            .into_iter()
            .skip(usize::try_from(self.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(self.limit()).unwrap_or(usize::MAX))
            .collect();
        PageResponse::new(page_items, self.page, self.limit(), total)
    }

    /// Return the SQL `LIMIT` value. A deserialized request bypasses
    /// [`PageRequest::new`], so the size is clamped here too.
    pub fn limit(&self) -> u64 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Paginated response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T: Serialize> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Current page number (1-based).
    pub page: u64,
    /// Number of items per page.
    pub page_size: u64,
    /// Total number of items across all pages.
    pub total_items: u64,
    /// Total number of pages.
    pub total_pages: u64,
    /// Whether there is a next page.
    pub has_next: bool,
    /// Whether there is a previous page.
    pub has_previous: bool,
}

impl<T: Serialize> PageResponse<T> {
    /// Create a new paginated response.
    pub fn new(items: Vec<T>, page: u64, page_size: u64, total_items: u64) -> Self {
        let page_size = page_size.max(1);
        let total_pages = if total_items == 0 {
            1
        } else {
            total_items.div_ceil(page_size)
        };
        Self {
            items,
            page,
            page_size,
            total_items,
            total_pages,
            has_next: page < total_pages,
            has_previous: page > 1,
        }
    }
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps() {
        let page = PageRequest::new(0, 1000);
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_slice() {
        let page = PageRequest::new(2, 3);
        let response = page.slice((1..=7).collect::<Vec<u32>>());
        assert_eq!(response.items, vec![4, 5, 6]);
        assert_eq!(response.total_items, 7);
        assert_eq!(response.total_pages, 3);
        assert!(response.has_next);
        assert!(response.has_previous);
    }

    #[test]
    fn test_deserialized_extremes_do_not_panic() {
        let page: PageRequest =
            serde_json::from_str(r#"{"page": 18446744073709551615, "page_size": 0}"#).unwrap();
        assert_eq!(page.limit(), 1);
        assert_eq!(page.offset(), u64::MAX - 1);
        let response = page.slice(vec![1, 2, 3]);
        assert!(response.items.is_empty());
        assert_eq!(response.page_size, 1);
        assert_eq!(response.total_pages, 3);

        let huge = PageRequest {
            page: u64::MAX,
            page_size: MAX_PAGE_SIZE,
        };
        assert_eq!(huge.offset(), u64::MAX);
    }

    #[test]
    fn test_response_with_zero_page_size() {
        let response = PageResponse::new(vec!["a"], 1, 0, 5);
        assert_eq!(response.page_size, 1);
        assert_eq!(response.total_pages, 5);
        assert!(response.has_next);
    }
}
