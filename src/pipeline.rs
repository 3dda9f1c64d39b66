//! Fetch → recommend → render orchestration.
//!
//! One cooperative task per invocation. Required inputs are validated
//! synchronously before any network activity, advisory phase strings are
//! emitted through the injected observer, and every failure is converted
//! at this boundary into one of {empty sequence, explicit error, advisory
//! message} — no raw transport or parse error reaches the render stage.

use std::sync::Arc;

use tracing::warn;

use crate::cache::KvCache;
use crate::collection::{CollectionFetcher, CollectionItem, HttpCollectionTransport};
use crate::config::{FetchStrategy, PipelineConfig};
use crate::error::{Result, ScoutError};
use crate::progress::{
    ProgressObserver, CREDENTIAL_ADVISORY, PHASE_FETCHING_COLLECTION,
    PHASE_FETCHING_RECOMMENDATIONS,
};
use crate::recommend::{PromptParams, Recommendation, Recommender};
use crate::render;

/// Caller inputs for one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineParams {
    /// Remote user identifier whose collection is fetched.
    pub user_id: String,
    /// Credential passed through to the completion endpoint as a bearer token.
    pub credential: String,
    /// Completion model override; `None` uses the default.
    pub model: Option<String>,
    pub prompt: PromptParams,
}

/// The assembled pipeline: fetcher, recommender, and shared cache.
pub struct Pipeline {
    fetcher: CollectionFetcher,
    recommender: Recommender,
    cache: Arc<dyn KvCache>,
    config: PipelineConfig,
}

impl Pipeline {
    /// Assemble the pipeline with real HTTP transports.
    pub fn new(cache: Arc<dyn KvCache>, config: PipelineConfig) -> Self {
        let fetcher = CollectionFetcher::new(
            Arc::new(HttpCollectionTransport::new()),
            cache.clone(),
            config,
        );
        Self {
            fetcher,
            recommender: Recommender::new(),
            cache,
            config,
        }
    }

    /// Assemble from pre-built components (tests, custom endpoints).
    pub fn with_components(
        fetcher: CollectionFetcher,
        recommender: Recommender,
        cache: Arc<dyn KvCache>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            fetcher,
            recommender,
            cache,
            config,
        }
    }

    /// Run the full pipeline and return the rendered result text.
    pub async fn run(
        &self,
        params: &PipelineParams,
        observer: &dyn ProgressObserver,
    ) -> Result<String> {
        validate(params)?;

        observer.phase(PHASE_FETCHING_COLLECTION);
        let collection = self.fetch_collection(&params.user_id, observer).await?;

        observer.phase(PHASE_FETCHING_RECOMMENDATIONS);
        let recommendations = self
            .fetch_recommendations(params, &collection, observer)
            .await?;

        Ok(render::render_text(&recommendations, self.cache.as_ref()))
    }

    /// Fetch the collection, applying the per-strategy propagation policy:
    /// direct mode degrades to an empty collection on failure, cached mode
    /// propagates so the caller can tell "no games" from "fetch failed".
    async fn fetch_collection(
        &self,
        user_id: &str,
        observer: &dyn ProgressObserver,
    ) -> Result<Vec<CollectionItem>> {
        match self.fetcher.fetch(user_id, observer).await {
            Ok(items) => Ok(items),
            Err(e) if self.config.strategy == FetchStrategy::Direct => {
                warn!("Collection fetch failed, continuing with empty collection: {}", e);
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Request recommendations. Credential-side transport failures become
    /// an advisory plus an empty sequence; contract violations propagate.
    async fn fetch_recommendations(
        &self,
        params: &PipelineParams,
        collection: &[CollectionItem],
        observer: &dyn ProgressObserver,
    ) -> Result<Vec<Recommendation>> {
        match self
            .recommender
            .recommend(
                &params.credential,
                collection,
                &params.prompt,
                params.model.as_deref(),
                &self.config,
            )
            .await
        {
            Ok(recommendations) => Ok(recommendations),
            Err(ScoutError::Credential(msg)) => {
                warn!("Recommendation request failed: {}", msg);
                observer.phase(CREDENTIAL_ADVISORY);
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }
}

/// Reject missing required caller parameters before any network activity.
fn validate(params: &PipelineParams) -> Result<()> {
    if params.user_id.trim().is_empty() {
        return Err(ScoutError::Config("user id must not be empty".into()));
    }
    if params.credential.trim().is_empty() {
        return Err(ScoutError::Config("API credential must not be empty".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_user_id_rejected() {
        let params = PipelineParams {
            credential: "sk-test".into(),
            ..Default::default()
        };
        assert!(matches!(validate(&params), Err(ScoutError::Config(_))));
    }

    #[test]
    fn test_missing_credential_rejected() {
        let params = PipelineParams {
            user_id: "alice".into(),
            ..Default::default()
        };
        assert!(matches!(validate(&params), Err(ScoutError::Config(_))));
    }

    #[test]
    fn test_complete_params_accepted() {
        let params = PipelineParams {
            user_id: "alice".into(),
            credential: "sk-test".into(),
            ..Default::default()
        };
        assert!(validate(&params).is_ok());
    }
}
