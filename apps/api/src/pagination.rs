//! Page arithmetic for list endpoints.

pub const DEFAULT_PER_PAGE: i64 = 25;
pub const MAX_PER_PAGE: i64 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl PageRequest {
    /// `None` when no page was requested. `per_page` is clamped to `1..=MAX_PER_PAGE`.
    pub fn from_query(page: Option<i64>, per_page: Option<i64>) -> Option<Self> {
        page.map(|page| PageRequest {
            page,
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// 1-indexed, always within `1..=max(total_pages, 1)`.
    pub page: i64,
    pub total_pages: i64,
    pub offset: i64,
    pub limit: i64,
}

/// Out-of-range pages clamp to the first or last page.
pub fn calculate_pagination(total_results: i64, request: PageRequest) -> Pagination {
    let per_page = request.per_page.max(1);
    let total_pages = (total_results + per_page - 1) / per_page;
    let page = request.page.max(1).min(total_pages.max(1));
    Pagination {
        page,
        total_pages,
        offset: (page - 1) * per_page,
        limit: per_page,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(page: i64, per_page: i64) -> PageRequest {
        PageRequest { page, per_page }
    }

    #[test]
    fn test_pagination_normal() {
        let p = calculate_pagination(60, req(2, 25));
        assert_eq!(p.page, 2);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.offset, 25);
    }

    #[test]
    fn test_pagination_clamps_out_of_range() {
        assert_eq!(calculate_pagination(60, req(99, 25)).page, 3);
        assert_eq!(calculate_pagination(60, req(-4, 25)).offset, 0);
    }

    #[test]
    fn test_pagination_empty() {
        let p = calculate_pagination(0, req(3, 25));
        assert_eq!(p.page, 1);
        assert_eq!(p.total_pages, 0);
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn test_per_page_defaults_and_caps() {
        assert_eq!(PageRequest::from_query(Some(1), None).unwrap().per_page, DEFAULT_PER_PAGE);
        assert_eq!(PageRequest::from_query(Some(1), Some(5000)).unwrap().per_page, MAX_PER_PAGE);
        assert_eq!(PageRequest::from_query(None, Some(10)), None);
    }
}
