//! HTTP client for the Tavily search API.

use std::time::Duration;

use async_trait::async_trait;
use meetingprep_shared::{MeetingPrepError, Result, SearchConfig};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{SearchHit, SearchProvider};

/// User-Agent string for search requests.
const USER_AGENT: &str = concat!("MeetingPrep/", env!("CARGO_PKG_VERSION"));

/// Connection and request settings for [`TavilyClient`].
#[derive(Debug, Clone)]
pub struct TavilyOptions {
    pub base_url: String,
    pub max_results: u32,
    pub search_depth: String,
    pub timeout_secs: u64,
}

impl From<&SearchConfig> for TavilyOptions {
    fn from(config: &SearchConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            max_results: config.max_results,
            search_depth: config.search_depth.clone(),
            timeout_secs: config.timeout_secs,
        }
    }
}

impl Default for TavilyOptions {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    max_results: u32,
    search_depth: &'a str,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

/// Tavily search client.
pub struct TavilyClient {
    client: Client,
    api_key: String,
    options: TavilyOptions,
}

impl TavilyClient {
    /// Build a client. Fails only if the HTTP stack cannot be initialised.
    pub fn new(api_key: impl Into<String>, options: TavilyOptions) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(options.timeout_secs))
            .build()
            .map_err(|e| {
                MeetingPrepError::Network(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            options,
        })
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.options.base_url.trim_end_matches('/'))
    }

    fn map_send_error(&self, e: reqwest::Error) -> MeetingPrepError {
        if e.is_timeout() {
            MeetingPrepError::Timeout {
                service: "search",
                secs: self.options.timeout_secs,
            }
        } else {
            MeetingPrepError::Network(format!("search request failed: {e}"))
        }
    }
}

#[async_trait]
impl SearchProvider for TavilyClient {
    #[instrument(skip_all, fields(query = %query))]
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let url = self.search_url();
        let body = SearchRequest {
            query,
            max_results: self.options.max_results,
            search_depth: &self.options.search_depth,
        };

        debug!(%url, max_results = body.max_results, "sending search request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            let detail: String = detail.chars().take(200).collect();
            return Err(MeetingPrepError::Search(format!("HTTP {status}: {detail}")));
        }

        let parsed: SearchResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                self.map_send_error(e)
            } else {
                MeetingPrepError::Search(format!("invalid search response: {e}"))
            }
        })?;

        debug!(results = parsed.results.len(), "search response parsed");
        Ok(parsed.results)
    }

    fn name(&self) -> &str {
        "tavily"
    }
}
