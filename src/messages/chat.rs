//! OpenAI-compatible chat-completion provider.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::{MessageProvider, MessageRequest, ProviderError};

const SYSTEM_PROMPT: &str = "You write short wedding thank-you card messages. Write only the message body: no greeting line, no sign-off and no names of the couple. Keep it under 70 words.";

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// One model behind a chat-completions endpoint.
#[derive(Clone)]
pub struct ChatCompletionProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    label: String,
}

impl ChatCompletionProvider {
    pub fn new(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let model = model.into();
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            label: format!("chat:{}", model),
            model,
        }
    }

    pub fn prompt(request: &MessageRequest) -> String {
        let gift = match request.gift.as_deref().map(str::trim).filter(|g| !g.is_empty()) {
            Some(gift) => format!("They gave us: {}.", gift),
            None => "They celebrated with us.".to_string(),
        };
        format!(
            "Write a {} thank-you message for {}. {}",
            request.tone.describe(),
            request.recipient_name,
            gift
        )
    }
}

/// 429 and 5xx are worth retrying; other client errors are not.
pub fn classify_status(status: StatusCode) -> Option<ProviderError> {
    if status.is_success() {
        None
    } else if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        Some(ProviderError::Transient(format!("HTTP {}", status)))
    } else {
        Some(ProviderError::Permanent(format!("HTTP {}", status)))
    }
}

#[async_trait]
impl MessageProvider for ChatCompletionProvider {
    fn name(&self) -> &str {
        &self.label
    }

    async fn generate(&self, request: &MessageRequest) -> Result<String, ProviderError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: Self::prompt(request),
                },
            ],
            max_tokens: 200,
            temperature: 0.8,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Transient(e.to_string()))?;

        if let Some(err) = classify_status(response.status()) {
            return Err(err);
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Permanent(format!("unreadable response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| ProviderError::Permanent("response had no message content".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::Tone;

    #[test]
    fn test_classify_status() {
        assert_eq!(classify_status(StatusCode::OK), None);
        assert!(classify_status(StatusCode::TOO_MANY_REQUESTS)
            .unwrap()
            .is_transient());
        assert!(classify_status(StatusCode::BAD_GATEWAY)
            .unwrap()
            .is_transient());
        assert!(!classify_status(StatusCode::UNAUTHORIZED)
            .unwrap()
            .is_transient());
    }

    #[test]
    fn test_prompt_mentions_tone_and_gift() {
        let prompt = ChatCompletionProvider::prompt(&MessageRequest {
            recipient_name: "Aunt Susan".into(),
            gift: Some("Crystal vase".into()),
            tone: Tone::Formal,
        });
        assert!(prompt.contains("formal and gracious"));
        assert!(prompt.contains("Aunt Susan"));
        assert!(prompt.contains("Crystal vase"));
    }

    #[test]
    fn test_name_includes_model() {
        let provider = ChatCompletionProvider::new(
            reqwest::Client::new(),
            "http://localhost/v1/chat/completions",
            "key",
            "gpt-4o-mini",
        );
        assert_eq!(provider.name(), "chat:gpt-4o-mini");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transient() {
        let provider = ChatCompletionProvider::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9/v1/chat/completions",
            "key",
            "m",
        );
        let err = provider
            .generate(&MessageRequest {
                recipient_name: "Ann".into(),
                gift: None,
                tone: Tone::Warm,
            })
            .await
            .unwrap_err();
        assert!(err.is_transient());
    }
}
