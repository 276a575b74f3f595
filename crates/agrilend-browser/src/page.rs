//! Page arithmetic.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Rows per page when the caller does not choose.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// 1-based page number and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: usize,
    pub page_size: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// Page 0 is read as page 1 and page size 0 as 1.
    pub fn new(page: usize, page_size: usize) -> Self {
        Pagination {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    /// `ceil(count / page_size)`, never less than 1.
    pub fn page_count(&self, count: usize) -> usize {
        count.div_ceil(self.page_size.max(1)).max(1)
    }

    /// Same pagination with the page clamped to `[1, page_count(count)]`.
    pub fn clamped(&self, count: usize) -> Self {
        Pagination {
            page: self.page.clamp(1, self.page_count(count)),
            page_size: self.page_size.max(1),
        }
    }

    /// Index range of this page within `count` rows; empty past the end.
    pub fn range(&self, count: usize) -> Range<usize> {
        let size = self.page_size.max(1);
        let start = (self.page.max(1) - 1).saturating_mul(size).min(count);
        let end = start.saturating_add(size).min(count);
        start..end
    }

    pub fn slice<'a, T>(&self, rows: &'a [T]) -> &'a [T] {
        &rows[self.range(rows.len())]
    }
}

/// Derived counts describing the displayed page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub page: usize,
    pub page_size: usize,
    pub page_count: usize,
    /// Rows left after search and filters.
    pub filtered_count: usize,
    /// Rows in the source.
    pub total_count: usize,
    /// 1-based index of the first row shown; 0 when the page is empty.
    pub first_row: usize,
    /// 1-based index of the last row shown; 0 when the page is empty.
    pub last_row: usize,
}

impl PageInfo {
    pub fn new(pagination: Pagination, filtered_count: usize, total_count: usize) -> Self {
        let range = pagination.range(filtered_count);
        let (first_row, last_row) = if range.is_empty() {
            (0, 0)
        } else {
            (range.start + 1, range.end)
        };
        PageInfo {
            page: pagination.page,
            page_size: pagination.page_size,
            page_count: pagination.page_count(filtered_count),
            filtered_count,
            total_count,
            first_row,
            last_row,
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.page_count
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_has_floor_of_one() {
        let p = Pagination::new(1, 10);
        assert_eq!(p.page_count(0), 1);
        assert_eq!(p.page_count(1), 1);
        assert_eq!(p.page_count(10), 1);
        assert_eq!(p.page_count(11), 2);
        assert_eq!(p.page_count(25), 3);
    }

    #[test]
    fn zero_inputs_are_normalised() {
        let p = Pagination::new(0, 0);
        assert_eq!((p.page, p.page_size), (1, 1));
    }

    #[test]
    fn range_and_slice() {
        let rows: Vec<u32> = (1..=25).collect();
        assert_eq!(Pagination::new(1, 10).slice(&rows), &rows[0..10]);
        assert_eq!(Pagination::new(3, 10).slice(&rows), &[21, 22, 23, 24, 25]);
        assert!(Pagination::new(4, 10).slice(&rows).is_empty());
    }

    #[test]
    fn clamp_pulls_page_back_in_range() {
        assert_eq!(Pagination::new(9, 10).clamped(25).page, 3);
        assert_eq!(Pagination::new(9, 10).clamped(0).page, 1);
        assert_eq!(Pagination::new(2, 10).clamped(25).page, 2);
    }

    #[test]
    fn page_info_rows() {
        let info = PageInfo::new(Pagination::new(3, 10), 25, 40);
        assert_eq!((info.first_row, info.last_row), (21, 25));
        assert_eq!(info.page_count, 3);
        assert!(!info.has_next());
        assert!(info.has_prev());

        let empty = PageInfo::new(Pagination::default(), 0, 0);
        assert_eq!((empty.first_row, empty.last_row), (0, 0));
        assert_eq!(empty.page_count, 1);
    }
}
