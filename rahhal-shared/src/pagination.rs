use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Normalized page coordinates for a listing query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// Clamp raw query values into a usable window. Page numbers start at 1;
    /// page size is capped so a single request cannot drain the store.
    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Self {
        let page = page.unwrap_or(1).max(1);
        let page_size = page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        Self { page, page_size }
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.page_size as i64
    }

    pub fn limit(&self) -> i64 {
        self.page_size as i64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Pagination metadata returned alongside every listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_count: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PageMeta {
    pub fn new(request: PageRequest, total_count: u64) -> Self {
        let total_pages = total_count.div_ceil(request.page_size as u64) as u32;
        Self {
            current_page: request.page,
            total_pages,
            total_count,
            has_next: request.page < total_pages,
            has_prev: request.page > 1 && total_count > 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_defaults_and_clamp() {
        let req = PageRequest::new(None, None);
        assert_eq!(req.page, 1);
        assert_eq!(req.page_size, DEFAULT_PAGE_SIZE);

        let req = PageRequest::new(Some(0), Some(0));
        assert_eq!(req.page, 1);
        assert_eq!(req.page_size, 1);

        let req = PageRequest::new(Some(3), Some(10_000));
        assert_eq!(req.page_size, MAX_PAGE_SIZE);
        assert_eq!(req.offset(), 2 * MAX_PAGE_SIZE as i64);
    }

    #[test]
    fn test_meta_consistency() {
        // 45 rows at 10 per page -> 5 pages, last page short
        let meta = PageMeta::new(PageRequest::new(Some(1), Some(10)), 45);
        assert_eq!(meta.total_pages, 5);
        assert!(meta.has_next);
        assert!(!meta.has_prev);

        let meta = PageMeta::new(PageRequest::new(Some(5), Some(10)), 45);
        assert!(!meta.has_next);
        assert!(meta.has_prev);
    }

    #[test]
    fn test_meta_page_beyond_range() {
        // Requesting past the end is not an error, metadata stays truthful
        let meta = PageMeta::new(PageRequest::new(Some(9), Some(10)), 45);
        assert_eq!(meta.current_page, 9);
        assert_eq!(meta.total_pages, 5);
        assert!(!meta.has_next);
    }

    #[test]
    fn test_meta_empty_result() {
        let meta = PageMeta::new(PageRequest::default(), 0);
        assert_eq!(meta.total_pages, 0);
        assert!(!meta.has_next);
        assert!(!meta.has_prev);
    }
}
