// src/utils/pagination.rs

use serde::Serialize;

/// One page of results in the envelope the client paginates with.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub current_page: i64,
    pub last_page: i64,
    pub per_page: i64,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, current_page: i64, per_page: i64, total: i64) -> Self {
        Self {
            data,
            current_page,
            last_page: last_page(total, per_page),
            per_page,
            total,
        }
    }
}

/// Clamps a requested 1-based page and returns `(page, offset)`.
/// The offset saturates, so a page far past the end just comes back empty.
pub fn page_offset(requested: Option<i64>, per_page: i64) -> (i64, i64) {
    let page = requested.unwrap_or(1).max(1);
    (page, (page - 1).saturating_mul(per_page))
}

/// Number of the last page; an empty collection still has page 1.
pub fn last_page(total: i64, per_page: i64) -> i64 {
    if total <= 0 || per_page <= 0 {
        return 1;
    }
    (total + per_page - 1) / per_page
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_offset_clamps() {
        assert_eq!(page_offset(None, 15), (1, 0));
        assert_eq!(page_offset(Some(0), 15), (1, 0));
        assert_eq!(page_offset(Some(-3), 15), (1, 0));
        assert_eq!(page_offset(Some(3), 15), (3, 30));
        assert_eq!(page_offset(Some(i64::MAX), 15), (i64::MAX, i64::MAX));
    }

    #[test]
    fn test_last_page() {
        assert_eq!(last_page(0, 15), 1);
        assert_eq!(last_page(15, 15), 1);
        assert_eq!(last_page(16, 15), 2);
        assert_eq!(last_page(31, 15), 3);
    }

    #[test]
    fn test_page_envelope() {
        let page = Page::new(vec![1, 2], 2, 2, 5);
        assert_eq!(page.last_page, 3);
        assert_eq!(page.data.len(), 2);
    }
}
