use super::types::{FilterCriteria, PaperRecord};

/// Applies the date and keyword filters, then sorts newest first.
///
/// - Date: a dated record is kept iff `published >= min_date`. Undated
///   records are kept.
/// - Keyword: kept iff the case-folded keyword occurs in the title or
///   summary. Records with neither are dropped while a keyword is active.
/// - Sort: stable, date descending, undated records last.
pub fn apply(records: &[PaperRecord], criteria: &FilterCriteria) -> Vec<PaperRecord> {
    let keyword = criteria.folded_keyword();

    let mut kept: Vec<PaperRecord> = records
        .iter()
        .filter(|r| passes_date(r, criteria))
        .filter(|r| keyword.as_deref().map_or(true, |k| matches_keyword(r, k)))
        .cloned()
        .collect();

    if kept.len() < records.len() {
        tracing::debug!(
            total = records.len(),
            kept = kept.len(),
            "Filtered feed records"
        );
    }

    sort_by_date_desc(&mut kept);
    kept
}

/// Stable sort by date, newest first. `None` orders below every date.
pub fn sort_by_date_desc(records: &mut [PaperRecord]) {
    // Option<T> orders None < Some, so reversing the comparison puts undated last.
    records.sort_by(|a, b| b.published.cmp(&a.published));
}

fn passes_date(record: &PaperRecord, criteria: &FilterCriteria) -> bool {
    match (criteria.min_date, record.published) {
        (Some(min), Some(published)) => published >= min,
        _ => true,
    }
}

/// `keyword` must already be case-folded.
fn matches_keyword(record: &PaperRecord, keyword: &str) -> bool {
    let in_title = record
        .title_text()
        .is_some_and(|t| t.to_lowercase().contains(keyword));
    let in_summary = record
        .summary
        .as_deref()
        .is_some_and(|s| s.to_lowercase().contains(keyword));
    in_title || in_summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::date::parse_date;
    use crate::feed::types::{NO_LINK, UNTITLED};
    use pretty_assertions::assert_eq;

    fn record(title: &str, date: Option<&str>) -> PaperRecord {
        PaperRecord {
            title: title.to_string(),
            authors: Vec::new(),
            published: date.map(|d| parse_date(d).unwrap()),
            published_raw: date.map(String::from),
            link: NO_LINK.to_string(),
            summary: None,
        }
    }

    fn titles(records: &[PaperRecord]) -> Vec<&str> {
        records.iter().map(|r| r.title.as_str()).collect()
    }

    #[test]
    fn test_no_criteria_only_sorts() {
        let records = vec![
            record("old", Some("2024-01-01")),
            record("new", Some("2024-01-03")),
        ];
        let out = apply(&records, &FilterCriteria::default());
        assert_eq!(titles(&out), vec!["new", "old"]);
    }

    #[test]
    fn test_date_filter_keeps_undated() {
        let records = vec![
            record("jan1", Some("2024-01-01")),
            record("jan3", Some("2024-01-03")),
            record("undated", None),
        ];
        let criteria = FilterCriteria::new(Some(parse_date("2024-01-02").unwrap()), None);
        let out = apply(&records, &criteria);
        assert_eq!(titles(&out), vec!["jan3", "undated"]);
    }

    #[test]
    fn test_date_filter_is_inclusive() {
        let records = vec![record("boundary", Some("2024-01-02"))];
        let criteria = FilterCriteria::new(Some(parse_date("2024-01-02").unwrap()), None);
        assert_eq!(titles(&apply(&records, &criteria)), vec!["boundary"]);
    }

    #[test]
    fn test_keyword_is_case_insensitive() {
        let records = vec![
            record("transformer models", None),
            record("graph networks", None),
        ];
        let criteria = FilterCriteria::new(None, Some("Transformer".into()));
        assert_eq!(
            titles(&apply(&records, &criteria)),
            vec!["transformer models"]
        );
    }

    #[test]
    fn test_keyword_matches_summary() {
        let mut r = record("Untitled work", None);
        r.summary = Some("We study RETRIEVAL augmented generation.".into());
        let criteria = FilterCriteria::new(None, Some("retrieval".into()));
        assert_eq!(apply(&[r], &criteria).len(), 1);
    }

    #[test]
    fn test_keyword_excludes_records_without_text() {
        let records = vec![record(UNTITLED, None)];
        // "n/a" would match the sentinel title if it counted as text
        let criteria = FilterCriteria::new(None, Some("n/a".into()));
        assert!(apply(&records, &criteria).is_empty());
    }

    #[test]
    fn test_both_filters_compose() {
        let records = vec![
            record("llm agents", Some("2024-01-01")),
            record("llm reasoning", Some("2024-01-05")),
            record("protein folding", Some("2024-01-06")),
        ];
        let criteria = FilterCriteria::new(
            Some(parse_date("2024-01-02").unwrap()),
            Some("LLM".into()),
        );
        assert_eq!(titles(&apply(&records, &criteria)), vec!["llm reasoning"]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_dates() {
        let mut records = vec![
            record("a", Some("2024-01-01")),
            record("b", None),
            record("c", Some("2024-01-01")),
            record("d", Some("2024-02-01")),
            record("e", None),
        ];
        sort_by_date_desc(&mut records);
        assert_eq!(titles(&records), vec!["d", "a", "c", "b", "e"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(apply(&[], &FilterCriteria::default()).is_empty());
    }
}
