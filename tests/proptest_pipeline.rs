//! Property-based tests for filtering, sorting and pagination.

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;

use paperfeed::feed::paginate::total_pages;
use paperfeed::feed::{filter, paginate, FilterCriteria, PaperRecord, NO_LINK};

/// Records with distinct titles (their original position) and optional dates.
fn arb_records() -> impl Strategy<Value = Vec<PaperRecord>> {
    proptest::collection::vec(proptest::option::of(0i64..2_000_000_000), 0..60).prop_map(|dates| {
        dates
            .into_iter()
            .enumerate()
            .map(|(i, secs)| PaperRecord {
                title: format!("paper {i}"),
                authors: Vec::new(),
                published: secs.and_then(|s| Utc.timestamp_opt(s, 0).single()),
                published_raw: None,
                link: NO_LINK.to_string(),
                summary: None,
            })
            .collect()
    })
}

fn position(record: &PaperRecord) -> usize {
    record
        .title
        .trim_start_matches("paper ")
        .parse()
        .unwrap_or(usize::MAX)
}

proptest! {
    /// Every page from 1 to total_pages is non-empty; later pages are empty.
    #[test]
    fn pages_in_range_are_non_empty(records in arb_records(), size in 1usize..15) {
        let total = total_pages(records.len(), size);
        for page in 1..=total {
            prop_assert!(!paginate(&records, page, size).items.is_empty());
        }
        prop_assert!(paginate(&records, total + 1, size).items.is_empty());
        prop_assert!(paginate(&records, total + 100, size).items.is_empty());
    }

    /// Pages cover every record exactly once, in order.
    #[test]
    fn pages_partition_records(records in arb_records(), size in 1usize..15) {
        let total = total_pages(records.len(), size);
        let joined: Vec<PaperRecord> = (1..=total)
            .flat_map(|p| paginate(&records, p, size).items.to_vec())
            .collect();
        prop_assert_eq!(joined, records);
    }

    /// Dates never increase, undated records come last, and ties keep their
    /// original order.
    #[test]
    fn sort_is_descending_and_stable(mut records in arb_records()) {
        filter::sort_by_date_desc(&mut records);

        for pair in records.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            match (a.published, b.published) {
                (Some(x), Some(y)) => prop_assert!(x >= y),
                (None, Some(_)) => prop_assert!(false, "undated record sorted before a dated one"),
                _ => {}
            }
            if a.published == b.published {
                prop_assert!(position(a) < position(b));
            }
        }
    }

    /// With no criteria, filtering only sorts.
    #[test]
    fn empty_criteria_keeps_everything(records in arb_records()) {
        let kept = filter::apply(&records, &FilterCriteria::default());
        prop_assert_eq!(kept.len(), records.len());
    }

    /// The date filter keeps undated records and dated ones at or after the bound.
    #[test]
    fn date_filter_respects_bound(records in arb_records(), bound in 0i64..2_000_000_000) {
        let min: DateTime<Utc> = Utc.timestamp_opt(bound, 0).unwrap();
        let kept = filter::apply(&records, &FilterCriteria::new(Some(min), None));

        let expected = records
            .iter()
            .filter(|r| r.published.map_or(true, |d| d >= min))
            .count();
        prop_assert_eq!(kept.len(), expected);
    }
}
