//! Personalized message generation.
//!
//! - `chain` - ordered provider list with retry/backoff and a local fallback
//! - `chat` - OpenAI-compatible chat-completion provider
//! - `local` - deterministic tone-based messages

pub mod chain;
pub mod chat;
pub mod local;

pub use chain::{FallbackChain, RetryPolicy};
pub use chat::ChatCompletionProvider;
pub use local::LocalMessages;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Warm,
    Formal,
    Casual,
    Poetic,
}

impl Tone {
    pub fn describe(self) -> &'static str {
        match self {
            Tone::Warm => "warm and heartfelt",
            Tone::Formal => "formal and gracious",
            Tone::Casual => "casual and friendly",
            Tone::Poetic => "poetic, in a few short rhyming lines",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tone::Warm => "warm",
            Tone::Formal => "formal",
            Tone::Casual => "casual",
            Tone::Poetic => "poetic",
        };
        f.write_str(name)
    }
}

/// What a provider needs to write one card's message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRequest {
    pub recipient_name: String,
    pub gift: Option<String>,
    pub tone: Tone,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Worth retrying: rate limits, server errors, timeouts.
    #[error("transient provider failure: {0}")]
    Transient(String),
    /// Retrying the same provider will not help.
    #[error("provider failure: {0}")]
    Permanent(String),
}

impl ProviderError {
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::Transient(_))
    }
}

/// A source of message bodies.
#[async_trait]
pub trait MessageProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, request: &MessageRequest) -> Result<String, ProviderError>;
}

/// One chat provider per configured model, in order. Without an API key the
/// chain answers from local messages only.
pub fn chain_from_config(config: &crate::config::AppConfig, client: reqwest::Client) -> FallbackChain {
    let Some(api_key) = config.llm_api_key.as_deref() else {
        log::info!("LLM_API_KEY not set, using local messages only");
        return FallbackChain::local_only();
    };

    let steps = config
        .llm_models
        .iter()
        .map(|model| {
            let provider: std::sync::Arc<dyn MessageProvider> = std::sync::Arc::new(
                ChatCompletionProvider::new(client.clone(), &config.llm_api_url, api_key, model),
            );
            (provider, RetryPolicy::default())
        })
        .collect();
    FallbackChain::new(steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn test_chain_without_key_is_local_only() {
        let mut config = AppConfig::for_tests();
        config.llm_models = vec!["gpt-4o-mini".into()];
        let chain = chain_from_config(&config, reqwest::Client::new());
        assert!(chain.provider_names().is_empty());
    }

    #[test]
    fn test_chain_follows_model_order() {
        let mut config = AppConfig::for_tests();
        config.llm_api_key = Some("key".into());
        config.llm_models = vec!["first".into(), "second".into()];
        let chain = chain_from_config(&config, reqwest::Client::new());
        assert_eq!(chain.provider_names(), vec!["chat:first", "chat:second"]);
    }

    #[test]
    fn test_tone_serde() {
        let tone: Tone = serde_json::from_str(r#""poetic""#).unwrap();
        assert_eq!(tone, Tone::Poetic);
        assert_eq!(Tone::Formal.to_string(), "formal");
    }
}
