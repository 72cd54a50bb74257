use chrono::{DateTime, Utc};

/// Title used when a feed entry carries no title of its own.
pub const UNTITLED: &str = "N/A";

/// Link used when a feed entry carries no link of its own.
pub const NO_LINK: &str = "#";

// ============================================================================
// Records
// ============================================================================

/// One paper, from either the search API or an RSS/Atom feed.
///
/// `title` and `link` are always populated (lenient extraction falls back to
/// [`UNTITLED`] and [`NO_LINK`]). `published` is `None` whenever no date could
/// be parsed; sorting and filtering treat that as "no date available".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperRecord {
    pub title: String,
    /// Author names in feed order.
    pub authors: Vec<String>,
    pub published: Option<DateTime<Utc>>,
    /// Date text exactly as the source provided it (search path only).
    pub published_raw: Option<String>,
    pub link: String,
    pub summary: Option<String>,
}

impl PaperRecord {
    /// Authors joined for display, e.g. `"Ada Lovelace, Alan Turing"`.
    pub fn authors_display(&self) -> String {
        self.authors.join(", ")
    }

    /// Title text usable for matching; the [`UNTITLED`] sentinel is not text.
    pub fn title_text(&self) -> Option<&str> {
        if self.title == UNTITLED || self.title.trim().is_empty() {
            None
        } else {
            Some(&self.title)
        }
    }
}

/// Records extracted from one feed, plus feed-level metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedResult {
    /// Feed title (e.g. "cs.AI updates on arXiv.org")
    pub title: Option<String>,
    /// Feed-level published/updated date; entries without a date inherit it.
    pub published: Option<DateTime<Utc>>,
    pub records: Vec<PaperRecord>,
}

impl FeedResult {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ============================================================================
// Filter criteria
// ============================================================================

/// Optional minimum date and keyword applied before sorting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Inclusive lower bound; undated records always pass.
    pub min_date: Option<DateTime<Utc>>,
    /// Case-insensitive substring matched against title or summary.
    pub keyword: Option<String>,
}

impl FilterCriteria {
    pub fn new(min_date: Option<DateTime<Utc>>, keyword: Option<String>) -> Self {
        Self { min_date, keyword }
    }

    /// The case-folded keyword, or `None` when absent or blank.
    pub fn folded_keyword(&self) -> Option<String> {
        self.keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_lowercase)
    }

    pub fn is_empty(&self) -> bool {
        self.min_date.is_none() && self.folded_keyword().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str) -> PaperRecord {
        PaperRecord {
            title: title.to_string(),
            authors: vec!["Ada Lovelace".into(), "Alan Turing".into()],
            published: None,
            published_raw: None,
            link: NO_LINK.to_string(),
            summary: None,
        }
    }

    #[test]
    fn test_authors_display_joins_in_order() {
        assert_eq!(record("x").authors_display(), "Ada Lovelace, Alan Turing");
    }

    #[test]
    fn test_authors_display_empty() {
        let mut r = record("x");
        r.authors.clear();
        assert_eq!(r.authors_display(), "");
    }

    #[test]
    fn test_sentinel_title_is_not_text() {
        assert_eq!(record(UNTITLED).title_text(), None);
        assert_eq!(record("  ").title_text(), None);
        assert_eq!(record("Attention").title_text(), Some("Attention"));
    }

    #[test]
    fn test_blank_keyword_is_no_filter() {
        let criteria = FilterCriteria::new(None, Some("   ".into()));
        assert!(criteria.folded_keyword().is_none());
        assert!(criteria.is_empty());

        let criteria = FilterCriteria::new(None, Some(" Transformer ".into()));
        assert_eq!(criteria.folded_keyword().as_deref(), Some("transformer"));
    }
}
