//! REST client for the Google Custom Search image endpoint.
//!
//! Issues a single `GET` per query with `searchType=image` and returns the
//! `link` of every item, in response order.

use serde::Deserialize;

/// Production search endpoint.
pub const SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "GOOGLE_API_KEY";

/// Environment variable holding the custom search engine id.
pub const ENGINE_ID_VAR: &str = "GOOGLE_CUSTOM_SEARCH_ENGINE_ID";

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// API key and engine id sent with every search.
///
/// Empty values are passed through untouched; the endpoint answers with an
/// authentication error rather than this client refusing locally.
#[derive(Clone, Default)]
pub struct SearchCredentials {
    pub api_key: String,
    pub engine_id: String,
}

impl SearchCredentials {
    /// Read both values from the process environment, defaulting to empty.
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var(API_KEY_VAR).unwrap_or_default(),
            engine_id: std::env::var(ENGINE_ID_VAR).unwrap_or_default(),
        }
    }

    /// `true` when either value is missing.
    pub fn is_incomplete(&self) -> bool {
        self.api_key.is_empty() || self.engine_id.is_empty()
    }
}

impl std::fmt::Debug for SearchCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &str| if v.is_empty() { "<unset>" } else { "<redacted>" };
        f.debug_struct("SearchCredentials")
            .field("api_key", &redact(&self.api_key))
            .field("engine_id", &redact(&self.engine_id))
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SearchResponse {
    /// Absent (or `null`) when the query matched nothing.
    items: Option<Vec<SearchItem>>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    link: String,
}

/// Decode a search response body into the ordered list of image URLs.
pub fn parse_search_response(body: &str) -> Result<Vec<String>, SearchError> {
    let response: SearchResponse = serde_json::from_str(body)?;
    Ok(response
        .items
        .unwrap_or_default()
        .into_iter()
        .map(|item| item.link)
        .collect())
}

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Errors from the search layer.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Search was called without a query.
    #[error("Search query must not be empty")]
    EmptyQuery,

    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The endpoint returned a non-2xx status code.
    #[error("Search API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The body was not the expected JSON shape.
    #[error("Malformed search response: {0}")]
    Decode(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client for the image search endpoint. Also performs the image
/// downloads, so one connection pool serves the whole run.
pub struct CustomSearchApi {
    client: reqwest::Client,
    endpoint: String,
    credentials: SearchCredentials,
}

impl CustomSearchApi {
    /// Create a client for the production endpoint.
    pub fn new(credentials: SearchCredentials) -> Self {
        Self::with_client(reqwest::Client::new(), SEARCH_ENDPOINT.to_string(), credentials)
    }

    /// Create a client reusing an existing [`reqwest::Client`] against an
    /// arbitrary endpoint URL.
    pub fn with_client(
        client: reqwest::Client,
        endpoint: String,
        credentials: SearchCredentials,
    ) -> Self {
        Self {
            client,
            endpoint,
            credentials,
        }
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Run an image search for `query`.
    ///
    /// Sends `GET {endpoint}?q=..&key=..&cx=..&searchType=image` with every
    /// value URL-encoded. Returns an empty list when the response has no
    /// `items`.
    pub async fn search(&self, query: &str) -> Result<Vec<String>, SearchError> {
        if query.trim().is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", query),
                ("key", self.credentials.api_key.as_str()),
                ("cx", self.credentials.engine_id.as_str()),
                ("searchType", "image"),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SearchError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let urls = parse_search_response(&body)?;
        tracing::debug!(query, results = urls.len(), "Search response decoded");
        Ok(urls)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
