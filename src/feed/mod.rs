//! The paper pipeline: acquire, extract, filter, sort, paginate.
//!
//! # Architecture
//!
//! Leaf modules first:
//!
//! - [`date`] - best-effort date parsing into `DateTime<Utc>`
//! - [`fetcher`] - single-shot HTTP retrieval of feeds and search results
//! - [`cache`] - per-session TTL cache of extracted feeds
//! - [`extract`] - Atom/RSS text to [`PaperRecord`]s (strict search path,
//!   lenient feed path)
//! - [`filter`] - date/keyword filtering and stable date-descending sort
//! - [`paginate`] - fixed-size pages over the filtered list
//! - [`catalog`] - the arXiv feeds offered for browsing
//! - [`schedule`] - optional weekend pause policy
//!
//! # Example
//!
//! ```ignore
//! use paperfeed::feed::{extract_feed, fetch_feed, filter, paginate, FilterCriteria};
//!
//! let bytes = fetch_feed(&client, ArxivFeed::Ai.url()).await?;
//! let feed = extract_feed(&bytes)?;
//! let records = filter::apply(&feed.records, &FilterCriteria::default());
//! let page = paginate(&records, 1, 10);
//! ```

pub mod cache;
pub mod catalog;
pub mod date;
pub mod extract;
pub mod fetcher;
pub mod filter;
pub mod paginate;
pub mod schedule;
mod types;

pub use cache::{CachedFeed, FeedCache};
pub use catalog::ArxivFeed;
pub use date::{parse_date, parse_date_opt, start_of_day, UnparseableDateError};
pub use extract::{
    extract_feed, extract_search, ExtractError, MalformedEntryError, SearchExtraction,
};
pub use fetcher::{fetch_feed, search, search_url, FetchError, MAX_SEARCH_RESULTS};
pub use paginate::{paginate, Page, DEFAULT_PAGE_SIZE};
pub use schedule::WeekendPolicy;
pub use types::{FeedResult, FilterCriteria, PaperRecord, NO_LINK, UNTITLED};
