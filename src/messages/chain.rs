//! Provider chain: try each provider under its retry policy, then fall back
//! to local messages. The chain itself never fails.

use std::sync::Arc;
use std::time::Duration;

use super::local::LocalMessages;
use super::{MessageProvider, MessageRequest};

/// Exponential backoff settings for one provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub multiplier: f64,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
            multiplier: 2.0,
            max_backoff: Duration::from_secs(10),
        }
    }

    /// Single attempt, no retries.
    pub fn once() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Delay before retry number `retry` (1-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = self.multiplier.powi(retry.saturating_sub(1) as i32);
        self.initial_backoff.mul_f64(factor).min(self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500))
    }
}

/// Where a generated message came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageSource {
    Provider(String),
    Local,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedMessage {
    pub text: String,
    pub source: MessageSource,
}

#[derive(Clone, Default)]
pub struct FallbackChain {
    steps: Vec<(Arc<dyn MessageProvider>, RetryPolicy)>,
    local: LocalMessages,
}

impl FallbackChain {
    pub fn new(steps: Vec<(Arc<dyn MessageProvider>, RetryPolicy)>) -> Self {
        Self {
            steps,
            local: LocalMessages,
        }
    }

    /// A chain with no remote providers.
    pub fn local_only() -> Self {
        Self::default()
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.steps
            .iter()
            .map(|(provider, _)| provider.name().to_string())
            .collect()
    }

    pub async fn generate(&self, request: &MessageRequest) -> GeneratedMessage {
        for (provider, policy) in &self.steps {
            if let Some(text) = Self::attempt(provider.as_ref(), policy, request).await {
                return GeneratedMessage {
                    text,
                    source: MessageSource::Provider(provider.name().to_string()),
                };
            }
        }

        log::info!(
            "All message providers failed for '{}', using local {} message",
            request.recipient_name,
            request.tone
        );
        GeneratedMessage {
            text: self.local.generate(request),
            source: MessageSource::Local,
        }
    }

    async fn attempt(
        provider: &dyn MessageProvider,
        policy: &RetryPolicy,
        request: &MessageRequest,
    ) -> Option<String> {
        for attempt in 1..=policy.max_attempts {
            match provider.generate(request).await {
                Ok(text) if !text.trim().is_empty() => return Some(text.trim().to_string()),
                Ok(_) => {
                    log::warn!("Provider {} returned an empty message", provider.name());
                    return None;
                }
                Err(err) if err.is_transient() && attempt < policy.max_attempts => {
                    let delay = policy.backoff(attempt);
                    log::warn!(
                        "Provider {} attempt {}/{} failed: {}. Retrying in {:?}",
                        provider.name(),
                        attempt,
                        policy.max_attempts,
                        err,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    log::warn!("Provider {} gave up: {}", provider.name(), err);
                    return None;
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{ProviderError, Tone};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct ScriptedProvider {
        name: &'static str,
        transient_failures: u32,
        permanent: bool,
        calls: AtomicU32,
    }

    impl ScriptedProvider {
        fn new(name: &'static str, transient_failures: u32, permanent: bool) -> Arc<Self> {
            Arc::new(Self {
                name,
                transient_failures,
                permanent,
                calls: AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl MessageProvider for ScriptedProvider {
        fn name(&self) -> &str {
            self.name
        }

        async fn generate(&self, request: &MessageRequest) -> Result<String, ProviderError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.permanent {
                return Err(ProviderError::Permanent("bad request".into()));
            }
            if call < self.transient_failures {
                return Err(ProviderError::Transient("overloaded".into()));
            }
            Ok(format!("{} says thanks to {}", self.name, request.recipient_name))
        }
    }

    fn request() -> MessageRequest {
        MessageRequest {
            recipient_name: "Ann".to_string(),
            gift: Some("Vase".to_string()),
            tone: Tone::Warm,
        }
    }

    fn fast(attempts: u32) -> RetryPolicy {
        RetryPolicy::new(attempts, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_retries_transient_failures() {
        let primary = ScriptedProvider::new("primary", 2, false);
        let chain = FallbackChain::new(vec![(primary.clone(), fast(3))]);

        let message = chain.generate(&request()).await;
        assert_eq!(message.source, MessageSource::Provider("primary".into()));
        assert_eq!(primary.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_falls_through_to_next_provider() {
        let primary = ScriptedProvider::new("primary", 10, false);
        let secondary = ScriptedProvider::new("secondary", 0, false);
        let chain = FallbackChain::new(vec![
            (primary.clone(), fast(2)),
            (secondary.clone(), fast(2)),
        ]);

        let message = chain.generate(&request()).await;
        assert_eq!(message.text, "secondary says thanks to Ann");
        assert_eq!(primary.calls.load(Ordering::SeqCst), 2);
        assert_eq!(secondary.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_permanent_failure_is_not_retried() {
        let primary = ScriptedProvider::new("primary", 0, true);
        let chain = FallbackChain::new(vec![(primary.clone(), fast(5))]);

        let message = chain.generate(&request()).await;
        assert_eq!(message.source, MessageSource::Local);
        assert_eq!(primary.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_local_only_chain() {
        let message = FallbackChain::local_only().generate(&request()).await;
        assert_eq!(message.source, MessageSource::Local);
        assert!(message.text.contains("vase"));
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(100),
            multiplier: 2.0,
            max_backoff: Duration::from_millis(300),
        };
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(300));
    }
}
