//! Recommendation requests against the completion endpoint.
//!
//! One synchronous POST per invocation, credential passed through as a
//! bearer token, no retry. The reply embeds a string payload that must
//! itself parse as a JSON array of [`Recommendation`] records; anything
//! else is a contract violation, never a best-effort partial list.

pub mod prompt;

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::collection::CollectionItem;
use crate::config::{PipelineConfig, COMPLETION_API_URL, DEFAULT_MODEL};
use crate::error::{Result, ScoutError};

pub use prompt::{build_messages, collection_summary, ChatMessage, PromptParams};

/// One model-suggested game.
///
/// The model is never asked for an image; any `image` field it volunteers
/// is ignored at deserialization and the presenter resolves images from the
/// cache by `id` instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: String,
    pub name: String,
    /// One-sentence description.
    pub summary: String,
    /// One sentence on differentiation; Full variant only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique: Option<String>,
    /// One sentence justifying the recommendation.
    pub reason: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Parse the completion payload string into recommendation records.
///
/// The payload must be a bare JSON array of the expected shape; prose,
/// objects, or truncated JSON fail explicitly. Sequences longer than
/// `max` are truncated with a warning — the prompt bounds the count, a
/// chattier model does not get to exceed it.
pub fn parse_recommendations(content: &str, max: usize) -> Result<Vec<Recommendation>> {
    let mut recommendations: Vec<Recommendation> = serde_json::from_str(content.trim())
        .map_err(|e| {
            ScoutError::Contract(format!(
                "completion payload is not a recommendation array: {e}"
            ))
        })?;
    if recommendations.len() > max {
        warn!(
            got = recommendations.len(),
            max, "Model returned more suggestions than asked for, truncating"
        );
        recommendations.truncate(max);
    }
    Ok(recommendations)
}

/// Issues recommendation requests to an OpenAI-compatible chat-completions
/// endpoint.
pub struct Recommender {
    client: Client,
    endpoint: String,
}

impl Recommender {
    pub fn new() -> Self {
        Self::with_endpoint(COMPLETION_API_URL)
    }

    /// Point the recommender at a non-default endpoint.
    pub fn with_endpoint(endpoint: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .expect("failed to build HTTP client"),
            endpoint: endpoint.to_string(),
        }
    }

    /// Request recommendations for `collection`.
    ///
    /// Transport failure or a non-success status surfaces as
    /// [`ScoutError::Credential`] — the caller should check their API key.
    /// An absent or empty choice list is a valid no-recommendations
    /// outcome, not an error.
    pub async fn recommend(
        &self,
        credential: &str,
        collection: &[CollectionItem],
        params: &PromptParams,
        model: Option<&str>,
        config: &PipelineConfig,
    ) -> Result<Vec<Recommendation>> {
        let model = model.unwrap_or(DEFAULT_MODEL);
        let messages = build_messages(collection, params, config.variant, config.ownership);
        let body = json!({
            "model": model,
            "messages": messages,
        });

        debug!(model, games = collection.len(), "Requesting recommendations");

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {credential}"))
            .json(&body)
            .send()
            .await
            .map_err(|e| ScoutError::Credential(format!("completion request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            // Pull the endpoint's own message out of the error body when it
            // has one.
            let detail = serde_json::from_str::<Value>(&error_text)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(String::from))
                .unwrap_or(error_text);
            return Err(ScoutError::Credential(format!(
                "completion endpoint returned status {status}: {detail}"
            )));
        }

        let reply: ChatResponse = response.json().await.map_err(|e| {
            ScoutError::Contract(format!("completion response is not valid JSON: {e}"))
        })?;

        let Some(choice) = reply.choices.first() else {
            debug!("Completion endpoint returned no choices");
            return Ok(Vec::new());
        };

        parse_recommendations(&choice.message.content, config.variant.max_suggestions())
    }
}

impl Default for Recommender {
    fn default() -> Self {
        Self::new()
    }
}
