//! Crate-wide error type.
//!
//! Each failure is converted at the boundary closest to its origin: the
//! fetcher and recommender map transport/parse problems into the variants
//! below, and the pipeline decides per mode whether a variant becomes an
//! empty result or propagates. Nothing transport-shaped reaches the render
//! stage.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, ScoutError>;

/// All errors the recommendation pipeline can surface.
#[derive(Error, Debug)]
pub enum ScoutError {
    /// Missing or invalid caller input, rejected before any network activity.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network or HTTP failure on the collection endpoint. Not retried.
    #[error("Collection fetch failed: {0}")]
    Transport(String),

    /// Transport failure on the completion endpoint. Surfaced as a
    /// "check your API key" condition; this endpoint has no retry policy.
    #[error("Recommendation request failed (check your API key): {0}")]
    Credential(String),

    /// The remote reply violated its data-shape contract (completion payload
    /// not a JSON array of recommendations, or similar). Never yields
    /// partial data.
    #[error("Contract violation: {0}")]
    Contract(String),

    /// The collection document could not be parsed as XML.
    #[error("XML parse error: {0}")]
    Xml(String),

    /// JSON (de)serialization failure in cache persistence.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_message_mentions_api_key() {
        let err = ScoutError::Credential("connection refused".into());
        let msg = err.to_string();
        assert!(
            msg.contains("API key"),
            "credential errors must point the user at their key: {msg}"
        );
    }

    #[test]
    fn test_variants_are_distinguishable() {
        let transport = ScoutError::Transport("timeout".into());
        let credential = ScoutError::Credential("timeout".into());
        assert_ne!(transport.to_string(), credential.to_string());
    }

    #[test]
    fn test_json_error_converts() {
        fn fails() -> Result<()> {
            serde_json::from_str::<Vec<String>>("not json")?;
            Ok(())
        }
        assert!(matches!(fails(), Err(ScoutError::Json(_))));
    }
}
