//! Web search for meeting context.
//!
//! The pipeline issues exactly one query per run (`"{company} recent news"`)
//! and feeds the concatenated result snippets into the first generation step.
//! The HTTP client speaks the Tavily search API; anything implementing
//! [`SearchProvider`] can stand in for it.

mod tavily;

use async_trait::async_trait;
use meetingprep_shared::Result;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

pub use tavily::{TavilyClient, TavilyOptions};

/// One search result as returned by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    /// Snippet text; the only part that reaches the prompts.
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// A hosted web search service.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run one query and return hits in service order.
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>>;

    /// Human-readable provider name for tracing.
    fn name(&self) -> &str;
}

/// The text block handed to the context step.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchContext {
    /// The query that was issued.
    pub query: String,
    /// Snippets joined by newlines.
    pub text: String,
    /// Number of hits the service returned.
    pub result_count: usize,
}

/// Build the news query for a company.
pub fn news_query(company_name: &str) -> String {
    format!("{} recent news", company_name.trim())
}

/// Join snippet contents with newlines, preserving service order.
pub fn join_snippets(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|hit| hit.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Search recent news for a company and collapse the hits into one blob.
///
/// Service failures propagate. An empty result list is not an error: the
/// run continues with an empty context.
#[instrument(skip_all, fields(provider = provider.name(), company = %company_name))]
pub async fn company_news(provider: &dyn SearchProvider, company_name: &str) -> Result<SearchContext> {
    let query = news_query(company_name);
    let hits = provider.search(&query).await?;

    if hits.is_empty() {
        warn!(%query, "search returned no results, continuing with empty context");
    } else {
        info!(%query, results = hits.len(), "search complete");
    }

    Ok(SearchContext {
        text: join_snippets(&hits),
        result_count: hits.len(),
        query,
    })
}
