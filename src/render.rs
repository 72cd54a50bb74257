//! Plain-text rendering of feed pages, search results and the feed catalog.
//!
//! Everything here returns a `String` so the shell decides where it goes.

use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::app::FeedView;
use crate::feed::{ArxivFeed, Page, PaperRecord, SearchExtraction};
use crate::util::truncate_to_width;

/// Width used when the terminal size is unknown.
pub const DEFAULT_WIDTH: usize = 100;

const NOT_AVAILABLE: &str = "N/A";
const INDENT: &str = "   ";

/// `YYYY-MM-DD`, or "N/A" for undated records.
pub fn format_date(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn rule(width: usize) -> String {
    "-".repeat(width.clamp(10, 80))
}

// ============================================================================
// Feed Pages
// ============================================================================

/// Header, one block per record on `page`, and the page indicator.
pub fn render_feed_page(view: &FeedView, page: &Page<'_>, width: usize) -> String {
    let mut out = String::new();

    let title = view.feed.title.as_deref().unwrap_or(NOT_AVAILABLE);
    let _ = writeln!(out, "RSS Feed: {}", truncate_to_width(title, width));
    if view.from_cache {
        let _ = writeln!(
            out,
            "Displaying cached data from {}",
            format_timestamp(view.fetched_at)
        );
    } else {
        let _ = writeln!(out, "Data refreshed at {}", format_timestamp(view.fetched_at));
    }
    if let Some(notice) = view.notice {
        let _ = writeln!(out, "{notice}");
    }
    let _ = writeln!(out, "{}", rule(width));

    if page.items.is_empty() {
        if page.total_records == 0 {
            let _ = writeln!(out, "No papers match the current filters.");
        } else {
            let _ = writeln!(out, "No papers on this page.");
        }
    }

    let first = page.number.saturating_sub(1).saturating_mul(page.size);
    for (i, record) in page.items.iter().enumerate() {
        write_feed_record(&mut out, first + i + 1, record, width);
    }

    let _ = writeln!(out, "{}", page.indicator());
    if view.feed.published.is_some() {
        let _ = writeln!(out, "Feed last updated on {}", format_date(view.feed.published));
    }
    out
}

fn write_feed_record(out: &mut String, number: usize, record: &PaperRecord, width: usize) {
    let inner = width.saturating_sub(INDENT.len());
    let label = format!("{number}. ");
    let _ = writeln!(
        out,
        "{label}{}",
        truncate_to_width(&record.title, width.saturating_sub(label.len()))
    );
    let _ = writeln!(out, "{INDENT}{}", record.link);
    if !record.authors.is_empty() {
        let authors = format!("Authors: {}", record.authors_display());
        let _ = writeln!(out, "{INDENT}{}", truncate_to_width(&authors, inner));
    }
    let _ = writeln!(out, "{INDENT}Published: {}", format_date(record.published));
    out.push('\n');
}

// ============================================================================
// Search Results
// ============================================================================

/// Every search result in API order, separated by rules.
pub fn render_search(query: &str, result: &SearchExtraction, width: usize) -> String {
    let mut out = String::new();
    let records = &result.feed.records;

    if records.is_empty() {
        let _ = writeln!(out, "No results found for \"{}\".", query.trim());
    } else {
        let _ = writeln!(
            out,
            "Found {} paper{} for \"{}\"",
            records.len(),
            if records.len() == 1 { "" } else { "s" },
            query.trim()
        );
    }
    if !result.malformed.is_empty() {
        let _ = writeln!(
            out,
            "Skipped {} incomplete entr{}.",
            result.malformed.len(),
            if result.malformed.len() == 1 { "y" } else { "ies" }
        );
    }

    for record in records {
        let _ = writeln!(out, "{}", rule(width));
        let _ = writeln!(out, "Title: {}", record.title);
        let _ = writeln!(out, "Authors: {}", record.authors_display());
        let _ = writeln!(
            out,
            "Published: {}",
            record.published_raw.as_deref().unwrap_or(NOT_AVAILABLE)
        );
        let _ = writeln!(out, "Link: {}", record.link);
        if let Some(summary) = &record.summary {
            let _ = writeln!(out, "Summary: {summary}");
        }
    }
    out
}

// ============================================================================
// Catalog
// ============================================================================

/// The built-in feeds with their CLI names and URLs.
pub fn render_catalog() -> String {
    use clap::ValueEnum;

    let mut out = String::new();
    for feed in ArxivFeed::ALL {
        let name = feed
            .to_possible_value()
            .map(|v| v.get_name().to_string())
            .unwrap_or_default();
        let _ = writeln!(out, "{name:<8} {:<22} {}", feed.label(), feed.url());
    }
    out
}
