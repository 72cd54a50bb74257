use futures::StreamExt;
use thiserror::Error;
use url::Url;

use super::schedule::format_next_update;

/// Upper bound on a feed or search response body (10 MiB).
const MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024;

/// Largest `max_results` the search path will request.
pub const MAX_SEARCH_RESULTS: u32 = 50;

/// Default arXiv query API endpoint.
pub const DEFAULT_SEARCH_ENDPOINT: &str = "http://export.arxiv.org/api/query";

/// Errors that can occur while acquiring feed or search content.
///
/// `EmptyFeed` and `Paused` are raised after a reachable source produced
/// nothing usable, so callers can word them differently from network
/// failures.
#[derive(Debug, Error)]
pub enum FetchError {
    /// DNS or connection failure; the host never answered
    #[error("Feed unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),
    /// Any other transport-level failure (TLS, body read, client timeout)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {status} {reason}")]
    HttpStatus { status: u16, reason: String },
    /// Response body exceeded the 10MB size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Response was incomplete (received fewer bytes than Content-Length)
    #[error("Incomplete response: expected {expected} bytes, received {received}")]
    IncompleteResponse { expected: u64, received: usize },
    /// Query, result count or endpoint rejected before any request was made
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    /// The feed was reachable but had no entries
    #[error("The feed is currently empty. This might be due to no recent updates.")]
    EmptyFeed,
    /// Weekend pause is active and nothing is cached for this feed
    #[error(
        "Feed updates are paused during weekends. Please check back on weekdays. \
         Next feed update expected on: {}",
        format_next_update(.next_update)
    )]
    Paused { next_update: chrono::DateTime<chrono_tz::Tz> },
}

impl From<url::ParseError> for FetchError {
    fn from(e: url::ParseError) -> Self {
        FetchError::InvalidRequest(format!("bad search endpoint: {e}"))
    }
}

fn classify(err: reqwest::Error) -> FetchError {
    if err.is_connect() {
        FetchError::Unreachable(err)
    } else {
        FetchError::Network(err)
    }
}

/// Builds an arXiv query API URL for a free-text search.
///
/// The query is phrase-quoted across all fields and results are ordered by
/// last-updated date, newest first:
/// `search_query=all:"<query>"&start=0&max_results=N&sortBy=lastUpdatedDate&sortOrder=descending`
///
/// # Errors
///
/// [`FetchError::InvalidRequest`] for a blank query, `max_results` outside
/// `1..=50`, or an unparseable endpoint.
pub fn search_url(endpoint: &str, query: &str, max_results: u32) -> Result<Url, FetchError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(FetchError::InvalidRequest("search query is empty".into()));
    }
    if !(1..=MAX_SEARCH_RESULTS).contains(&max_results) {
        return Err(FetchError::InvalidRequest(format!(
            "result count must be between 1 and {MAX_SEARCH_RESULTS}, got {max_results}"
        )));
    }

    let mut url = Url::parse(endpoint)?;
    url.query_pairs_mut()
        .append_pair("search_query", &format!("all:\"{query}\""))
        .append_pair("start", "0")
        .append_pair("max_results", &max_results.to_string())
        .append_pair("sortBy", "lastUpdatedDate")
        .append_pair("sortOrder", "descending");
    Ok(url)
}

/// Runs a search against the arXiv query API and returns the raw Atom text.
///
/// One request, no retries.
pub async fn search(
    client: &reqwest::Client,
    endpoint: &str,
    query: &str,
    max_results: u32,
) -> Result<String, FetchError> {
    let url = search_url(endpoint, query, max_results)?;
    tracing::debug!(url = %url, "Querying arXiv search API");

    let bytes = get_bytes(client, url.as_str()).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Fetches a feed document and returns its raw bytes.
///
/// One request, no retries, and no request timeout.
///
/// # Errors
///
/// - [`FetchError::Unreachable`] - connection could not be established
/// - [`FetchError::Network`] - other transport errors
/// - [`FetchError::HttpStatus`] - non-2xx HTTP response
/// - [`FetchError::ResponseTooLarge`] - response exceeded 10MB
/// - [`FetchError::IncompleteResponse`] - body shorter than Content-Length
pub async fn fetch_feed(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, FetchError> {
    tracing::debug!(feed = %url, "Fetching feed");
    get_bytes(client, url).await
}

async fn get_bytes(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, FetchError> {
    let response = client.get(url).send().await.map_err(classify)?;

    let status = response.status();
    if !status.is_success() {
        tracing::warn!(url = %url, status = %status, "Request returned non-success status");
        return Err(FetchError::HttpStatus {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        });
    }

    read_limited_bytes(response, MAX_RESPONSE_SIZE).await
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    let expected_length = response.content_length();

    // Fast path: check Content-Length header
    if let Some(len) = expected_length {
        if len > limit as u64 {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    if let Some(expected) = expected_length {
        if (bytes.len() as u64) < expected {
            return Err(FetchError::IncompleteResponse {
                expected,
                received: bytes.len(),
            });
        }
    }

    Ok(bytes)
}
