use std::collections::HashMap;

use chrono::Utc;
use futures::future::join_all;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{ResearchError, ResearchResult};
use crate::text::normalize;

use super::planner::Depth;
use super::types::{SearchResult, SourceContent};

const USER_AGENT: &str = "ted-research/0.1 (research assistant bot)";

/// Extracted page text is cut to this many characters.
pub const MAX_BODY_CHARS: usize = 10_000;
/// Raw bytes read from any one page.
const MAX_RAW_BYTES: usize = 2 * 1024 * 1024;
/// Pages with less extracted text than this are not used as sources.
pub const MIN_BODY_CHARS: usize = 200;
/// Results requested from the search API per query.
pub const RESULTS_PER_QUERY: usize = 5;

#[derive(Debug, Deserialize)]
struct SearchApiResponse {
    web: Option<SearchApiWeb>,
}

#[derive(Debug, Deserialize)]
struct SearchApiWeb {
    #[serde(default)]
    results: Vec<SearchApiHit>,
}

#[derive(Debug, Deserialize)]
struct SearchApiHit {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    description: Option<String>,
}

/// Result of the search → dedup → fetch stage.
#[derive(Debug, Default)]
pub struct Gathered {
    /// Deduplicated search results, capped by depth.
    pub results: Vec<SearchResult>,
    /// Pages that were fetched and long enough to use.
    pub sources: Vec<SourceContent>,
}

/// Web search plus page retrieval. Every public method is fail-soft except
/// [`WebClient::fetch_page`], which the summarize path needs to report on.
pub struct WebClient {
    http: reqwest::Client,
    search_key: Option<String>,
    search_endpoint: String,
}

impl WebClient {
    pub fn new(config: &Config) -> ResearchResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ResearchError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            search_key: config.search.api_key.clone(),
            search_endpoint: config.search.endpoint.clone(),
        })
    }

    pub fn search_available(&self) -> bool {
        self.search_key.is_some()
    }

    /// Query the search API. Any failure yields an empty list.
    pub async fn search(&self, query: &str, count: usize) -> Vec<SearchResult> {
        match self.try_search(query, count).await {
            Ok(results) => {
                debug!(query, count = results.len(), "search complete");
                results
            }
            Err(e) => {
                warn!(query, error = %e, "search failed, continuing without results");
                Vec::new()
            }
        }
    }

    async fn try_search(&self, query: &str, count: usize) -> ResearchResult<Vec<SearchResult>> {
        let Some(key) = &self.search_key else {
            return Err(ResearchError::Unavailable("SEARCH_API_KEY"));
        };

        let count = count.to_string();
        let resp = self
            .http
            .get(&self.search_endpoint)
            .query(&[("q", query), ("count", count.as_str())])
            .header("Accept", "application/json")
            .header("X-Subscription-Token", key)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ResearchError::Status(status.as_u16()));
        }

        let body: SearchApiResponse = resp
            .json()
            .await
            .map_err(|e| ResearchError::Decode(format!("search response: {e}")))?;

        Ok(body
            .web
            .map(|w| w.results)
            .unwrap_or_default()
            .into_iter()
            .filter(|hit| !hit.url.trim().is_empty())
            .map(|hit| SearchResult {
                title: hit.title.trim().to_string(),
                url: hit.url.trim().to_string(),
                description: hit.description.unwrap_or_default().trim().to_string(),
            })
            .collect())
    }

    /// Fetch a page and reduce it to plain text of at most
    /// [`MAX_BODY_CHARS`] characters.
    pub async fn fetch_page(&self, url: &str) -> ResearchResult<String> {
        let mut resp = self.http.get(url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ResearchError::Status(status.as_u16()));
        }

        // Markup shrinks under normalization, so read a generous multiple
        // of the text cap and stop there.
        let mut raw = Vec::new();
        while let Some(chunk) = resp.chunk().await? {
            raw.extend_from_slice(&chunk);
            if raw.len() >= MAX_RAW_BYTES {
                raw.truncate(MAX_RAW_BYTES);
                debug!(url, "page body truncated");
                break;
            }
        }

        let body = String::from_utf8_lossy(&raw);
        Ok(normalize(&body).chars().take(MAX_BODY_CHARS).collect())
    }

    /// Fail-soft fetch used for gathered sources; `""` means unusable.
    pub async fn fetch_and_extract(&self, url: &str) -> String {
        match self.fetch_page(url).await {
            Ok(text) => text,
            Err(e) => {
                warn!(url, error = %e, "fetch failed, skipping source");
                String::new()
            }
        }
    }

    /// Run every query, merge and deduplicate the hits, then fetch the top
    /// pages. Searches and fetches run concurrently; merge order follows
    /// query order, not completion order.
    pub async fn gather(&self, queries: &[String], depth: Depth) -> Gathered {
        if !self.search_available() {
            warn!("search capability not configured, skipping source gathering");
            return Gathered::default();
        }

        let batches = join_all(
            queries
                .iter()
                .map(|q| self.search(q, RESULTS_PER_QUERY)),
        )
        .await;

        let results = aggregate(batches, depth.result_cap());
        info!(
            queries = queries.len(),
            unique_results = results.len(),
            "search results aggregated"
        );

        let to_fetch: Vec<&SearchResult> = results.iter().take(depth.fetch_limit()).collect();
        let bodies = join_all(to_fetch.iter().map(|r| self.fetch_and_extract(&r.url))).await;

        let sources: Vec<SourceContent> = to_fetch
            .into_iter()
            .zip(bodies)
            .filter(|(_, body)| body.chars().count() >= MIN_BODY_CHARS)
            .map(|(result, body)| SourceContent {
                url: result.url.clone(),
                title: result.title.clone(),
                body,
                fetched_at: Utc::now(),
            })
            .collect();

        info!(
            fetched = depth.fetch_limit().min(results.len()),
            usable = sources.len(),
            "source pages gathered"
        );

        Gathered { results, sources }
    }
}

/// Flatten per-query batches (query order, then rank order), keep one entry
/// per URL, and cap the total.
///
/// A URL keeps the position of its first appearance but the value of its
/// last one.
pub fn aggregate(batches: Vec<Vec<SearchResult>>, cap: usize) -> Vec<SearchResult> {
    let mut merged: Vec<SearchResult> = Vec::new();
    let mut position: HashMap<String, usize> = HashMap::new();

    for result in batches.into_iter().flatten() {
        match position.get(&result.url) {
            Some(&i) => merged[i] = result,
            None => {
                position.insert(result.url.clone(), merged.len());
                merged.push(result);
            }
        }
    }

    merged.truncate(cap);
    merged
}
