use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::redirect::Policy;
use thiserror::Error;

use crate::config::Config;
use crate::feed::schedule::{next_update, WEEKEND_NOTICE};
use crate::feed::{
    extract_feed, extract_search, fetch_feed, filter, paginate, search, CachedFeed, ExtractError,
    FeedCache, FeedResult, FetchError, FilterCriteria, Page, PaperRecord, SearchExtraction,
    WeekendPolicy, DEFAULT_PAGE_SIZE,
};

// ============================================================================
// Pipeline Errors
// ============================================================================

/// Any failure of a search or browse action.
///
/// None of these end the session; the shell reports them and keeps going.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

impl PipelineError {
    /// One-line message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::Fetch(
                e @ (FetchError::EmptyFeed
                | FetchError::Paused { .. }
                | FetchError::InvalidRequest(_)),
            ) => e.to_string(),
            PipelineError::Fetch(FetchError::HttpStatus { status, reason }) => {
                format!("Failed to fetch data. Status code: {status} {reason}")
            }
            PipelineError::Fetch(e) => format!("Error fetching data: {e}"),
            PipelineError::Extract(e) => format!("Error parsing the feed: {e}"),
        }
    }
}

// ============================================================================
// HTTP Client Configuration
// ============================================================================

/// Redirect policy with loop detection, limited to 3 hops.
fn create_redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= 3 {
            return attempt.error("Too many redirects (max 3)");
        }

        let url = attempt.url();
        if attempt.previous().iter().any(|prev| prev.as_str() == url.as_str()) {
            return attempt.error("Redirect loop detected");
        }

        tracing::debug!(
            from = %attempt.previous().last().map(|u| u.as_str()).unwrap_or("initial"),
            to = %url,
            hop = attempt.previous().len() + 1,
            "Following redirect"
        );

        attempt.follow()
    })
}

/// HTTP client shared by every request of a session.
pub fn build_client(user_agent: &str) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .redirect(create_redirect_policy())
        .pool_max_idle_per_host(2)
        .pool_idle_timeout(Duration::from_secs(30))
        .build()
}

// ============================================================================
// Browse Results
// ============================================================================

/// A feed after filtering, plus where it came from.
#[derive(Debug, Clone)]
pub struct FeedView {
    /// The unfiltered feed as extracted
    pub feed: Arc<FeedResult>,
    /// Filtered and sorted records
    pub records: Vec<PaperRecord>,
    pub fetched_at: DateTime<Utc>,
    /// True when no request was made for this view
    pub from_cache: bool,
    /// Extra notice to show above the records (weekend pause)
    pub notice: Option<&'static str>,
}

impl FeedView {
    fn new(cached: CachedFeed, criteria: &FilterCriteria, from_cache: bool) -> Self {
        let records = filter::apply(&cached.feed.records, criteria);
        Self {
            feed: cached.feed,
            records,
            fetched_at: cached.fetched_at,
            from_cache,
            notice: None,
        }
    }
}

// ============================================================================
// Session Context
// ============================================================================

/// Per-session state: HTTP client, feed cache, last good feed and the
/// current page.
///
/// Owned mutably by the shell; nothing here is global.
pub struct App {
    client: reqwest::Client,
    cache: FeedCache,
    /// Most recent successfully fetched feed and its URL
    last_feed: Option<(String, CachedFeed)>,
    page: usize,
    page_size: usize,
    endpoint: String,
    weekend: WeekendPolicy,
}

impl App {
    pub fn new(config: &Config) -> reqwest::Result<Self> {
        let client = build_client(&config.user_agent)?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            cache: FeedCache::new(config.cache_capacity, config.cache_ttl()),
            last_feed: None,
            page: 1,
            page_size: if config.page_size == 0 {
                DEFAULT_PAGE_SIZE
            } else {
                config.page_size
            },
            endpoint: config.search_endpoint.clone(),
            weekend: WeekendPolicy::new(config.pause_on_weekends),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Searches arXiv and extracts the result entries in API order.
    ///
    /// Entries missing a title, id or summary are skipped and returned in
    /// `malformed`; an empty result is not an error.
    pub async fn search(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<SearchExtraction, PipelineError> {
        let xml = search(&self.client, &self.endpoint, query, max_results).await?;
        let extraction = extract_search(&xml)?;
        tracing::info!(
            query = %query.trim(),
            results = extraction.feed.records.len(),
            skipped = extraction.malformed.len(),
            "Search completed"
        );
        Ok(extraction)
    }

    /// Loads a feed (from cache when fresh) and applies `criteria`.
    pub async fn browse(
        &mut self,
        url: &str,
        criteria: &FilterCriteria,
    ) -> Result<FeedView, PipelineError> {
        self.browse_at(url, criteria, Utc::now()).await
    }

    /// [`App::browse`] with an explicit clock for the weekend policy.
    ///
    /// Order: fresh cache entry, then weekend pause (last good feed for the
    /// same URL or [`FetchError::Paused`]), then a network fetch. Only
    /// non-empty feeds are cached.
    pub async fn browse_at(
        &mut self,
        url: &str,
        criteria: &FilterCriteria,
        now: DateTime<Utc>,
    ) -> Result<FeedView, PipelineError> {
        if let Some(hit) = self.cache.get(url) {
            return Ok(FeedView::new(hit, criteria, true));
        }

        if self.weekend.is_paused(now) {
            return match &self.last_feed {
                Some((last_url, last)) if last_url == url => {
                    tracing::info!(feed = %url, "Weekend pause active, serving last fetched feed");
                    let mut view = FeedView::new(last.clone(), criteria, true);
                    view.notice = Some(WEEKEND_NOTICE);
                    Ok(view)
                }
                _ => Err(FetchError::Paused {
                    next_update: next_update(now),
                }
                .into()),
            };
        }

        let bytes = fetch_feed(&self.client, url).await.inspect_err(|e| {
            tracing::warn!(feed = %url, error = %e, "Feed fetch failed");
        })?;
        let feed = extract_feed(&bytes)?;
        if feed.is_empty() {
            tracing::warn!(feed = %url, "Feed has no entries");
            return Err(FetchError::EmptyFeed.into());
        }

        let entry = self.cache.insert(url, Arc::new(feed));
        self.last_feed = Some((url.to_string(), entry.clone()));
        Ok(FeedView::new(entry, criteria, false))
    }

    /// The current page of `view`.
    pub fn current_page<'a>(&self, view: &'a FeedView) -> Page<'a> {
        paginate(&view.records, self.page, self.page_size)
    }

    /// Advances one page if there is one. Returns whether the page changed.
    pub fn next_page(&mut self, total_pages: usize) -> bool {
        if self.page < total_pages {
            self.page += 1;
            true
        } else {
            false
        }
    }

    /// Goes back one page unless already on the first.
    pub fn previous_page(&mut self) -> bool {
        if self.page > 1 {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// Jumps to `page`; 0 is treated as 1.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    pub fn reset_page(&mut self) {
        self.page = 1;
    }

    /// Forgets everything known about `url` so the next browse refetches.
    pub fn refresh(&mut self, url: &str) {
        let dropped = self.cache.invalidate(url);
        if matches!(&self.last_feed, Some((last_url, _)) if last_url == url) {
            self.last_feed = None;
        }
        self.reset_page();
        tracing::debug!(feed = %url, dropped, "Refresh requested");
    }
}
