//! Collection retrieval.
//!
//! Fetches a user's board-game collection from the remote XML endpoint with
//! bounded exponential-backoff retry on the service's busy signal, and
//! populates the shared cache with per-item image references while parsing.
//!
//! `CollectionTransport` abstracts the HTTP call for testability;
//! `HttpCollectionTransport` is the real reqwest-backed implementation.

pub mod parser;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::KvCache;
use crate::config::{FetchStrategy, PipelineConfig, COLLECTION_API_BASE};
use crate::error::{Result, ScoutError};
use crate::progress::{ProgressObserver, BUSY_ADVISORY};

pub use parser::{parse_collection, ParsedCollection, BUSY_MESSAGE};

/// Attempt budget when busy-retry is enabled.
const MAX_ATTEMPTS: u32 = 5;

/// Backoff before attempt `n+1` is `1000ms * 2^(n-1)`: 1s, 2s, 4s, 8s.
const INITIAL_RETRY_DELAY_MS: u64 = 1000;

/// One owned/ownable game record from the collection endpoint.
///
/// `id` is stable across repeated fetches of the same remote item and is
/// the join key used to re-attach cached images to recommendations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionItem {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Numeric-as-string rating in [0.0, 10.0] or the `N/A` sentinel;
    /// absent when the collection was fetched without stats.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
}

/// Abstracts the collection endpoint HTTP call.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CollectionTransport: Send + Sync {
    /// GET `url` and return the response body as text.
    async fn get(&self, url: &str) -> Result<String>;
}

/// Real transport backed by a shared reqwest client.
pub struct HttpCollectionTransport {
    client: Client,
}

impl HttpCollectionTransport {
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .expect("failed to build HTTP client"),
        }
    }
}

impl Default for HttpCollectionTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CollectionTransport for HttpCollectionTransport {
    async fn get(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ScoutError::Transport(format!("collection request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ScoutError::Transport(format!(
                "collection endpoint returned status {}",
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| ScoutError::Transport(format!("failed to read collection body: {e}")))
    }
}

/// Retrieves and parses a user's collection, honoring the configured
/// strategy and retry policy.
pub struct CollectionFetcher {
    transport: Arc<dyn CollectionTransport>,
    cache: Arc<dyn KvCache>,
    config: PipelineConfig,
}

impl CollectionFetcher {
    pub fn new(
        transport: Arc<dyn CollectionTransport>,
        cache: Arc<dyn KvCache>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            transport,
            cache,
            config,
        }
    }

    /// Fetch the collection for `user_id`.
    ///
    /// Cached strategy serves a stored collection under the raw `user_id`
    /// key when present, otherwise fetches live and stores the result.
    /// Transport and parse failures surface as `Err` so callers can
    /// distinguish "no games" from "fetch failed"; busy exhaustion is an
    /// observer advisory plus an empty collection, never an error.
    pub async fn fetch(
        &self,
        user_id: &str,
        observer: &dyn ProgressObserver,
    ) -> Result<Vec<CollectionItem>> {
        match self.config.strategy {
            FetchStrategy::Direct => self.fetch_live(user_id, observer).await,
            FetchStrategy::Cached => {
                if let Some(stored) = self.cache.get(user_id) {
                    match serde_json::from_str::<Vec<CollectionItem>>(&stored) {
                        Ok(items) => {
                            debug!(user_id, items = items.len(), "Serving cached collection");
                            return Ok(items);
                        }
                        Err(e) => {
                            warn!(user_id, "Stored collection is corrupt, refetching: {}", e);
                        }
                    }
                }
                let items = self.fetch_live(user_id, observer).await?;
                if !items.is_empty() {
                    self.cache.put(user_id, &serde_json::to_string(&items)?);
                }
                Ok(items)
            }
        }
    }

    /// Issue the live request, retrying on the busy signal per policy.
    async fn fetch_live(
        &self,
        user_id: &str,
        observer: &dyn ProgressObserver,
    ) -> Result<Vec<CollectionItem>> {
        let url = self.collection_url(user_id);
        let max_attempts = if self.config.retry { MAX_ATTEMPTS } else { 1 };
        let mut attempt = 1u32;

        loop {
            let body = self.transport.get(&url).await?;
            let parsed = parse_collection(&body, self.cache.as_ref())?;

            if parsed.is_busy() {
                if attempt >= max_attempts {
                    observer.busy(BUSY_ADVISORY);
                    return Ok(Vec::new());
                }
                let delay =
                    Duration::from_millis(INITIAL_RETRY_DELAY_MS << (attempt - 1));
                debug!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Collection endpoint busy, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            debug!(user_id, items = parsed.items.len(), "Collection fetched");
            return Ok(parsed.items);
        }
    }

    /// Templated collection URL with mode-dependent filter flags.
    fn collection_url(&self, user_id: &str) -> String {
        let mut url = format!(
            "{COLLECTION_API_BASE}/collection?username={user_id}&own=1&excludesubtype=boardgameexpansion"
        );
        if self.config.variant.wants_stats() {
            url.push_str("&stats=1");
        }
        url
    }
}
