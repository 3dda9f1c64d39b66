//! Pipeline mode configuration.
//!
//! The pipeline evolved as two historical variants of the same design: a
//! full-prompt version (up to 8 suggestions, `unique` field, stats-backed
//! ratings, busy-retry enabled) and a compact version (up to 4 suggestions,
//! optional player count, no retry). Both are expressed here as one
//! configurable pipeline selected by [`PipelineConfig`].

use serde::{Deserialize, Serialize};

/// Collection endpoint base URL (XML API).
pub const COLLECTION_API_BASE: &str = "https://boardgamegeek.com/xmlapi2";

/// Completion endpoint URL (OpenAI-compatible chat completions).
pub const COMPLETION_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Default model when none is supplied at call time.
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Prompt/field-set variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PromptVariant {
    /// 1-8 suggestions, `unique` field required, collection fetched with
    /// stats so ratings are present.
    #[default]
    Full,
    /// 1-4 suggestions, no `unique` field, optional player-count parameter,
    /// collection fetched without stats.
    Simple,
}

impl PromptVariant {
    /// Maximum number of suggestions the model is asked for.
    pub fn max_suggestions(&self) -> usize {
        match self {
            Self::Full => 8,
            Self::Simple => 4,
        }
    }

    /// Whether the collection request includes per-item stats (ratings).
    pub fn wants_stats(&self) -> bool {
        matches!(self, Self::Full)
    }
}

/// Which subset of the collection the model may recommend from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OwnershipFilter {
    /// Only games the user already owns.
    #[default]
    Owned,
    /// Only games the user does not own but could buy.
    Unowned,
}

/// Collection retrieval strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FetchStrategy {
    /// Always issue a live network request.
    #[default]
    Direct,
    /// Serve a stored collection keyed by user id when present, otherwise
    /// fetch directly and store the result.
    Cached,
}

/// Full mode selection for one pipeline invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub variant: PromptVariant,
    pub ownership: OwnershipFilter,
    pub strategy: FetchStrategy,
    /// Busy-retry policy on the collection endpoint. The completion endpoint
    /// never retries regardless of this flag.
    pub retry: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            variant: PromptVariant::Full,
            ownership: OwnershipFilter::Owned,
            strategy: FetchStrategy::Direct,
            retry: true,
        }
    }
}

impl PipelineConfig {
    /// The compact historical variant: fewer suggestions, no retry.
    pub fn simple() -> Self {
        Self {
            variant: PromptVariant::Simple,
            ownership: OwnershipFilter::Owned,
            strategy: FetchStrategy::Direct,
            retry: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_full_variant_with_retry() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.variant, PromptVariant::Full);
        assert!(cfg.retry);
        assert_eq!(cfg.variant.max_suggestions(), 8);
    }

    #[test]
    fn test_simple_variant_caps_at_four_without_retry() {
        let cfg = PipelineConfig::simple();
        assert_eq!(cfg.variant.max_suggestions(), 4);
        assert!(!cfg.retry);
        assert!(!cfg.variant.wants_stats());
    }
}
