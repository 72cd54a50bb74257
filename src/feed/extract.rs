//! Turns raw Atom/RSS text into [`PaperRecord`]s.
//!
//! Two paths with deliberately different strictness:
//!
//! - [`extract_search`] reads responses from the arXiv query API, which we
//!   construct ourselves. Every entry must carry `<title>`, `<id>` and
//!   `<summary>`. An entry missing one is skipped, logged, and reported in
//!   [`SearchExtraction::malformed`]; the rest of the batch is kept.
//! - [`extract_feed`] reads third-party RSS/Atom feeds with `feed-rs` and
//!   fills gaps with defaults ([`UNTITLED`], [`NO_LINK`], no authors).

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

use super::date::parse_date_opt;
use super::types::{FeedResult, PaperRecord, NO_LINK, UNTITLED};
use crate::util::{collapse_whitespace, strip_control_chars};

/// The document as a whole could not be read.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Search response was not well-formed XML
    #[error("Malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),
    /// Feed was not recognisable RSS, Atom or JSON Feed
    #[error("Unreadable feed: {0}")]
    Feed(#[from] feed_rs::parser::ParseFeedError),
}

/// A search-API entry lacked a required element.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("entry {index} is missing <{field}>")]
pub struct MalformedEntryError {
    /// 0-based position of the entry in the response
    pub index: usize,
    pub field: &'static str,
}

/// Output of [`extract_search`].
#[derive(Debug, Default)]
pub struct SearchExtraction {
    pub feed: FeedResult,
    /// Entries that were skipped, in document order
    pub malformed: Vec<MalformedEntryError>,
}

// ============================================================================
// Search API (strict)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Id,
    Summary,
    Published,
    Updated,
    AuthorName,
}

#[derive(Debug, Default)]
struct EntryBuilder {
    title: Option<String>,
    id: Option<String>,
    summary: Option<String>,
    published: Option<String>,
    authors: Vec<String>,
    in_author: bool,
    author_name: String,
}

impl EntryBuilder {
    /// Marks `field` as present and returns its text buffer.
    fn buffer(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::Title => Some(self.title.get_or_insert_with(String::new)),
            Field::Id => Some(self.id.get_or_insert_with(String::new)),
            Field::Summary => Some(self.summary.get_or_insert_with(String::new)),
            Field::Published => Some(self.published.get_or_insert_with(String::new)),
            Field::AuthorName => Some(&mut self.author_name),
            // feed-level only
            Field::Updated => None,
        }
    }

    fn finish(self, index: usize) -> Result<PaperRecord, MalformedEntryError> {
        let required = |value: Option<String>, field| {
            value
                .map(|v| clean(&v))
                .filter(|v| !v.is_empty())
                .ok_or(MalformedEntryError { index, field })
        };

        let title = required(self.title, "title")?;
        let link = required(self.id, "id")?;
        let summary = required(self.summary, "summary")?;
        let published_raw = self.published.map(|p| p.trim().to_string());

        Ok(PaperRecord {
            title,
            authors: self.authors,
            published: published_raw.as_deref().and_then(parse_date_opt),
            published_raw,
            link,
            summary: Some(summary),
        })
    }
}

fn clean(text: &str) -> String {
    collapse_whitespace(&strip_control_chars(text))
}

/// Parses an arXiv query API (Atom) response.
///
/// # Errors
///
/// Returns [`ExtractError::Xml`] if the document is not well-formed. Entries
/// missing `<title>`, `<id>` or `<summary>` are not errors; they are skipped
/// and listed in [`SearchExtraction::malformed`].
pub fn extract_search(xml: &str) -> Result<SearchExtraction, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut out = SearchExtraction::default();

    let mut entry: Option<EntryBuilder> = None;
    let mut field: Option<Field> = None;
    let mut feed_title: Option<String> = None;
    let mut feed_updated: Option<String> = None;
    let mut index = 0;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let local = e.local_name();
                let name = local.as_ref();
                if name == b"entry" {
                    entry = Some(EntryBuilder::default());
                    field = None;
                    continue;
                }
                field = match entry.as_mut() {
                    Some(b) => match name {
                        b"author" => {
                            b.in_author = true;
                            b.author_name.clear();
                            None
                        }
                        b"name" if b.in_author => Some(Field::AuthorName),
                        b"title" => Some(Field::Title),
                        b"id" => Some(Field::Id),
                        b"summary" => Some(Field::Summary),
                        b"published" => Some(Field::Published),
                        _ => None,
                    },
                    None => match name {
                        b"title" => Some(Field::Title),
                        b"updated" => Some(Field::Updated),
                        _ => None,
                    },
                };
                if let (Some(f), Some(b)) = (field, entry.as_mut()) {
                    b.buffer(f);
                }
            }
            Event::Text(t) => {
                if let Some(f) = field {
                    let text = t.unescape().map_err(quick_xml::Error::from)?;
                    push_text(f, &text, entry.as_mut(), &mut feed_title, &mut feed_updated);
                }
            }
            Event::CData(c) => {
                if let Some(f) = field {
                    let text = String::from_utf8_lossy(&c);
                    push_text(f, &text, entry.as_mut(), &mut feed_title, &mut feed_updated);
                }
            }
            Event::End(e) => {
                let name = e.local_name();
                match name.as_ref() {
                    b"entry" => {
                        if let Some(b) = entry.take() {
                            match b.finish(index) {
                                Ok(record) => out.feed.records.push(record),
                                Err(err) => {
                                    tracing::warn!(error = %err, "Skipping malformed search entry");
                                    out.malformed.push(err);
                                }
                            }
                            index += 1;
                        }
                    }
                    b"name" => {
                        if let Some(b) = entry.as_mut().filter(|b| b.in_author) {
                            let author = clean(&b.author_name);
                            if !author.is_empty() {
                                b.authors.push(author);
                            }
                        }
                    }
                    b"author" => {
                        if let Some(b) = entry.as_mut() {
                            b.in_author = false;
                        }
                    }
                    _ => {}
                }
                field = None;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    out.feed.title = feed_title.map(|t| clean(&t)).filter(|t| !t.is_empty());
    out.feed.published = feed_updated.as_deref().and_then(parse_date_opt);

    tracing::debug!(
        entries = out.feed.records.len(),
        malformed = out.malformed.len(),
        "Extracted search results"
    );

    Ok(out)
}

fn push_text(
    field: Field,
    text: &str,
    entry: Option<&mut EntryBuilder>,
    feed_title: &mut Option<String>,
    feed_updated: &mut Option<String>,
) {
    match (entry, field) {
        (Some(b), f) => {
            if let Some(buf) = b.buffer(f) {
                buf.push_str(text);
            }
        }
        (None, Field::Title) => feed_title.get_or_insert_with(String::new).push_str(text),
        (None, Field::Updated) => feed_updated.get_or_insert_with(String::new).push_str(text),
        (None, _) => {}
    }
}

// ============================================================================
// RSS / Atom feeds (lenient)
// ============================================================================

/// Parses an RSS/Atom feed into records, defaulting any missing field.
///
/// Entry dates fall back to the entry's `updated` time and then to the
/// feed's own published/updated time.
///
/// # Errors
///
/// Returns [`ExtractError::Feed`] only when the document is not a feed at all.
pub fn extract_feed(bytes: &[u8]) -> Result<FeedResult, ExtractError> {
    let feed = feed_rs::parser::parse(bytes)?;

    let feed_date = feed.published.or(feed.updated);
    let title = feed
        .title
        .map(|t| clean(&t.content))
        .filter(|t| !t.is_empty());

    let records = feed
        .entries
        .into_iter()
        .map(|entry| {
            let title = entry
                .title
                .map(|t| clean(&t.content))
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| UNTITLED.to_string());
            let link = entry
                .links
                .first()
                .map(|l| strip_control_chars(l.href.trim()).into_owned())
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| NO_LINK.to_string());
            let authors = entry
                .authors
                .iter()
                .map(|p| clean(&p.name))
                .filter(|n| !n.is_empty())
                .collect();
            let summary = entry
                .summary
                .map(|s| s.content)
                .or_else(|| entry.content.and_then(|c| c.body))
                .map(|s| clean(&s))
                .filter(|s| !s.is_empty());

            PaperRecord {
                title,
                authors,
                published: entry.published.or(entry.updated).or(feed_date),
                published_raw: None,
                link,
                summary,
            }
        })
        .collect();

    Ok(FeedResult {
        title,
        published: feed_date,
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    const SEARCH_RESPONSE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:arxiv="http://arxiv.org/schemas/atom">
  <title type="html">ArXiv Query: search_query=all:"rag"</title>
  <updated>2024-03-06T00:00:00-05:00</updated>
  <entry>
    <id>http://arxiv.org/abs/2403.00001v1</id>
    <updated>2024-03-05T17:00:00Z</updated>
    <published>2024-03-05T17:00:00Z</published>
    <title>Retrieval Augmented
      Generation &amp; You</title>
    <summary>  We study retrieval.
    </summary>
    <author><name>Ada Lovelace</name><arxiv:affiliation>Analytical Engines</arxiv:affiliation></author>
    <author><name>Alan Turing</name></author>
    <link href="http://arxiv.org/abs/2403.00001v1" rel="alternate" type="text/html"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2403.00002v1</id>
    <published>not a date</published>
    <title>Second</title>
    <summary>Another.</summary>
  </entry>
</feed>"#;

    #[test]
    fn test_search_extracts_records() {
        let out = extract_search(SEARCH_RESPONSE).unwrap();
        assert!(out.malformed.is_empty());
        assert_eq!(out.feed.records.len(), 2);

        let first = &out.feed.records[0];
        assert_eq!(first.title, "Retrieval Augmented Generation & You");
        assert_eq!(first.link, "http://arxiv.org/abs/2403.00001v1");
        assert_eq!(first.summary.as_deref(), Some("We study retrieval."));
        assert_eq!(first.authors, vec!["Ada Lovelace", "Alan Turing"]);
        assert_eq!(first.authors_display(), "Ada Lovelace, Alan Turing");
        assert_eq!(first.published_raw.as_deref(), Some("2024-03-05T17:00:00Z"));
        assert_eq!(
            first.published,
            Some(Utc.with_ymd_and_hms(2024, 3, 5, 17, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_search_unparseable_date_is_none() {
        let out = extract_search(SEARCH_RESPONSE).unwrap();
        let second = &out.feed.records[1];
        assert_eq!(second.published, None);
        assert_eq!(second.published_raw.as_deref(), Some("not a date"));
        assert!(second.authors.is_empty());
    }

    #[test]
    fn test_search_feed_metadata() {
        let out = extract_search(SEARCH_RESPONSE).unwrap();
        assert_eq!(
            out.feed.title.as_deref(),
            Some(r#"ArXiv Query: search_query=all:"rag""#)
        );
        assert_eq!(
            out.feed.published,
            Some(Utc.with_ymd_and_hms(2024, 3, 6, 5, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_search_skips_entry_missing_summary() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
  <entry><id>a</id><title>Kept</title><summary>ok</summary></entry>
  <entry><id>b</id><title>Dropped</title></entry>
  <entry><id>c</id><title>Also kept</title><summary>ok</summary></entry>
</feed>"#;
        let out = extract_search(xml).unwrap();
        let titles: Vec<_> = out.feed.records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Kept", "Also kept"]);
        assert_eq!(
            out.malformed,
            vec![MalformedEntryError {
                index: 1,
                field: "summary"
            }]
        );
    }

    #[test]
    fn test_search_empty_required_field_is_malformed() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
  <entry><id>  </id><title>No id</title><summary>x</summary></entry>
  <entry><id>b</id><title/><summary>x</summary></entry>
</feed>"#;
        let out = extract_search(xml).unwrap();
        assert!(out.feed.records.is_empty());
        assert_eq!(out.malformed[0].field, "id");
        assert_eq!(out.malformed[1].field, "title");
    }

    #[test]
    fn test_search_no_entries() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>empty</title></feed>"#;
        let out = extract_search(xml).unwrap();
        assert!(out.feed.is_empty());
    }

    #[test]
    fn test_search_invalid_xml() {
        let xml = r#"<feed><entry><title>oops</summary></entry></feed>"#;
        assert!(matches!(extract_search(xml), Err(ExtractError::Xml(_))));
    }

    const RSS_FEED: &str = r#"<?xml version="1.0"?>
<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/">
<channel>
  <title>cs.AI updates on arXiv.org</title>
  <link>http://rss.arxiv.org/rss/cs.AI</link>
  <description>cs.AI updates</description>
  <pubDate>Tue, 05 Mar 2024 00:00:00 -0500</pubDate>
  <item>
    <title>First Paper</title>
    <link>https://arxiv.org/abs/2403.00001</link>
    <description>arXiv:2403.00001 Abstract: something</description>
    <dc:creator>Ada Lovelace</dc:creator>
    <guid>oai:arXiv.org:2403.00001v1</guid>
  </item>
  <item>
    <description>No title, no link</description>
    <guid>oai:arXiv.org:2403.00002v1</guid>
  </item>
</channel>
</rss>"#;

    #[test]
    fn test_feed_extracts_with_feed_date_fallback() {
        let feed = extract_feed(RSS_FEED.as_bytes()).unwrap();
        let feed_date = Utc.with_ymd_and_hms(2024, 3, 5, 5, 0, 0).unwrap();

        assert_eq!(feed.title.as_deref(), Some("cs.AI updates on arXiv.org"));
        assert_eq!(feed.published, Some(feed_date));
        assert_eq!(feed.records.len(), 2);

        let first = &feed.records[0];
        assert_eq!(first.title, "First Paper");
        assert_eq!(first.link, "https://arxiv.org/abs/2403.00001");
        assert_eq!(first.published, Some(feed_date));
        assert_eq!(
            first.summary.as_deref(),
            Some("arXiv:2403.00001 Abstract: something")
        );
    }

    #[test]
    fn test_feed_missing_fields_use_defaults() {
        let feed = extract_feed(RSS_FEED.as_bytes()).unwrap();
        let second = &feed.records[1];
        assert_eq!(second.title, UNTITLED);
        assert_eq!(second.link, NO_LINK);
        assert!(second.authors.is_empty());
        assert_eq!(second.authors_display(), "");
    }

    #[test]
    fn test_feed_entry_date_wins_over_feed_date() {
        let atom = r#"<?xml version="1.0"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom feed</title>
  <id>urn:feed</id>
  <updated>2024-03-10T00:00:00Z</updated>
  <entry>
    <id>urn:1</id>
    <title>Dated</title>
    <updated>2024-03-01T00:00:00Z</updated>
    <author><name>Grace Hopper</name></author>
    <link href="https://example.org/1"/>
  </entry>
</feed>"#;
        let feed = extract_feed(atom.as_bytes()).unwrap();
        let entry = &feed.records[0];
        assert_eq!(
            entry.published,
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(entry.authors, vec!["Grace Hopper"]);
    }

    #[test]
    fn test_feed_without_any_date() {
        let rss = r#"<rss version="2.0"><channel><title>t</title>
<item><title>Undated</title></item></channel></rss>"#;
        let feed = extract_feed(rss.as_bytes()).unwrap();
        assert_eq!(feed.published, None);
        assert_eq!(feed.records[0].published, None);
    }

    #[test]
    fn test_feed_strips_control_chars() {
        let rss = "<rss version=\"2.0\"><channel><title>t</title>\
<item><title>Evil\u{7f} Title</title></item></channel></rss>";
        let feed = extract_feed(rss.as_bytes()).unwrap();
        assert_eq!(feed.records[0].title, "Evil Title");
    }

    #[test]
    fn test_feed_not_a_feed() {
        assert!(matches!(
            extract_feed(b"<html><body>nope</body></html>"),
            Err(ExtractError::Feed(_))
        ));
    }
}
