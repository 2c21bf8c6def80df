//! Web search.

use crate::error::ConnectorError;
use async_trait::async_trait;
use rootcause::Report;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument};

/// One search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Page title.
    pub title: String,
    /// Short description of the page.
    pub snippet: String,
    /// Page URL.
    pub url: String,
}

impl fmt::Display for SearchHit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.snippet)
    }
}

/// A search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Query text.
    pub query: String,
    /// Maximum number of hits.
    pub count: u32,
}

impl SearchQuery {
    /// Creates a query.
    #[must_use]
    pub fn new(query: impl Into<String>, count: u32) -> Self {
        Self {
            query: query.into(),
            count,
        }
    }
}

/// A web search provider.
#[async_trait]
pub trait WebSearch: Send + Sync {
    /// Runs a search and returns at most `query.count` hits.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be reached or its payload is
    /// unreadable.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>, Report<ConnectorError>>;
}

/// Brave Search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BraveSearchConfig {
    /// API root.
    #[serde(default = "default_brave_base_url")]
    pub base_url: String,
    /// Subscription token.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Hits requested per search.
    #[serde(default = "default_result_count")]
    pub result_count: u32,
    /// Request timeout.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_brave_base_url() -> String {
    "https://api.search.brave.com".to_string()
}

fn default_result_count() -> u32 {
    3
}

fn default_timeout_seconds() -> u64 {
    15
}

impl Default for BraveSearchConfig {
    fn default() -> Self {
        Self {
            base_url: default_brave_base_url(),
            api_key: None,
            result_count: default_result_count(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

#[derive(Deserialize)]
struct BraveResponse {
    #[serde(default)]
    web: Option<BraveWeb>,
}

#[derive(Deserialize)]
struct BraveWeb {
    #[serde(default)]
    results: Vec<BraveResult>,
}

#[derive(Deserialize)]
struct BraveResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

impl From<BraveResult> for SearchHit {
    fn from(result: BraveResult) -> Self {
        Self {
            title: result.title.unwrap_or_default(),
            snippet: result.description.unwrap_or_default(),
            url: result.url.unwrap_or_default(),
        }
    }
}

/// Brave Search REST client.
pub struct BraveSearchClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl BraveSearchClient {
    /// Creates a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &BraveSearchConfig) -> Result<Self, Report<ConnectorError>> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ConnectorError::ConnectionFailed {
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            endpoint: format!("{}/res/v1/web/search", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone().filter(|key| !key.trim().is_empty()),
        })
    }
}

#[async_trait]
impl WebSearch for BraveSearchClient {
    #[instrument(skip(self, query), fields(count = query.count))]
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>, Report<ConnectorError>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ConnectorError::NotConfigured {
                connector: "brave".to_string(),
            })?;

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query.query.clone()), ("count", query.count.to_string())])
            .header("Accept", "application/json")
            .header("X-Subscription-Token", api_key)
            .send()
            .await
            .map_err(|e| ConnectorError::from_transport(&e))?;

        if !response.status().is_success() {
            return Err(ConnectorError::from_status(response).await.into());
        }

        let body: BraveResponse =
            response
                .json()
                .await
                .map_err(|e| ConnectorError::InvalidResponse {
                    reason: e.to_string(),
                })?;

        let hits: Vec<SearchHit> = body
            .web
            .map(|web| web.results)
            .unwrap_or_default()
            .into_iter()
            .take(query.count as usize)
            .map(SearchHit::from)
            .collect();

        debug!(hits = hits.len(), "web search completed");
        Ok(hits)
    }
}
