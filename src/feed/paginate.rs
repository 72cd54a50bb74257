use super::types::PaperRecord;

/// Records shown per page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// A window into a filtered, sorted record list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page<'a> {
    /// 1-based page number as requested (may exceed `total_pages`).
    pub number: usize,
    pub size: usize,
    pub items: &'a [PaperRecord],
    pub total_pages: usize,
    pub total_records: usize,
}

impl Page<'_> {
    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    /// "Page X of Y"
    pub fn indicator(&self) -> String {
        format!("Page {} of {}", self.number, self.total_pages)
    }
}

/// Number of pages needed for `count` records, `ceil(count / size)`.
pub fn total_pages(count: usize, size: usize) -> usize {
    if size == 0 {
        return 0;
    }
    count.div_ceil(size)
}

/// Slices out page `page` (1-based).
///
/// Out-of-range pages, page 0, and a page size of 0 all produce an empty
/// slice rather than an error.
pub fn paginate(records: &[PaperRecord], page: usize, size: usize) -> Page<'_> {
    let items = match page.checked_sub(1).and_then(|p| p.checked_mul(size)) {
        Some(start) if start < records.len() => {
            let end = start.saturating_add(size).min(records.len());
            &records[start..end]
        }
        _ => &[],
    };

    Page {
        number: page,
        size,
        items,
        total_pages: total_pages(records.len(), size),
        total_records: records.len(),
    }
}
