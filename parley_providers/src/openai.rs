use async_trait::async_trait;
use parley_core::{ChatMessage, LLMProvider, LLMResponse, Usage};
use reqwest::Client;
use serde_json::{Value, json};
use tracing::info;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Client for OpenAI-compatible `/chat/completions` endpoints.
///
/// Each call is a single attempt; failures are returned to the caller.
#[derive(Clone)]
pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAIProvider {
    pub fn new(api_key: String) -> Self {
        info!("Creating OpenAIProvider");
        Self {
            client: Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_request(messages: &[ChatMessage], model: &str) -> Value {
        json!({
            "model": model,
            "messages": messages,
        })
    }

    fn parse_response(response: &Value) -> anyhow::Result<LLMResponse> {
        let content = response["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Invalid response format: missing content"))?
            .to_string();

        let count = |u: &serde_json::Map<String, Value>, key: &str| {
            u32::try_from(u.get(key).and_then(Value::as_u64).unwrap_or(0)).unwrap_or(0)
        };
        let usage = response["usage"].as_object().map(|u| Usage {
            prompt_tokens: count(u, "prompt_tokens"),
            completion_tokens: count(u, "completion_tokens"),
            total_tokens: count(u, "total_tokens"),
        });

        Ok(LLMResponse { content, usage })
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    async fn chat(&self, messages: &[ChatMessage], model: &str) -> anyhow::Result<LLMResponse> {
        let request = Self::build_request(messages, model);

        info!(
            "Sending request to completion API: model={model}, messages={}",
            messages.len()
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;

        let parsed = Self::parse_response(&response)?;
        info!("Received response from completion API");
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_model_and_ordered_turns() {
        let messages = vec![
            ChatMessage::user("hello"),
            ChatMessage::assistant("hi"),
            ChatMessage::user("how are you?"),
        ];

        let request = OpenAIProvider::build_request(&messages, "gpt-3.5-turbo");

        assert_eq!(request["model"], "gpt-3.5-turbo");
        assert_eq!(request["messages"][0]["role"], "user");
        assert_eq!(request["messages"][1]["role"], "assistant");
        assert_eq!(request["messages"][2]["content"], "how are you?");
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn response_content_and_usage_are_extracted() {
        let response = json!({
            "choices": [{"message": {"role": "assistant", "content": "I'm fine."}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
        });

        let parsed =
            OpenAIProvider::parse_response(&response).expect("Failed to parse response");

        assert_eq!(parsed.content, "I'm fine.");
        let usage = parsed.usage.expect("Usage should be present");
        assert_eq!(usage.total_tokens, 15);
    }

    #[test]
    fn response_without_content_is_an_error() {
        let response = json!({"choices": []});
        assert!(OpenAIProvider::parse_response(&response).is_err());
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        let provider =
            OpenAIProvider::new("key".to_string()).with_base_url("http://localhost:8080/v1/".into());
        assert_eq!(provider.base_url(), "http://localhost:8080/v1");
    }
}
