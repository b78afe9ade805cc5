//! OpenAI-compatible chat completions backend.

use crate::http;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tessera_core::{TextCompletion, TokenUsage};
use tessera_error::TesseraResult;
use tessera_interface::TextBackend;
use tessera_rate_limit::ModelSettings;

const SERVICE: &str = "openai";

/// Environment variable holding the API key.
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ChatUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
}

/// Convert a chat completions response into a completion.
pub(crate) fn into_completion(response: ChatResponse) -> TesseraResult<TextCompletion> {
    let text = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| http::invalid(SERVICE, "Response contained no message content"))?;
    let usage = response.usage.unwrap_or_default();
    Ok(TextCompletion::new(
        text.trim(),
        TokenUsage::new(usage.prompt_tokens, usage.completion_tokens),
    ))
}

/// Text backend speaking the OpenAI chat completions protocol.
#[derive(Debug, Clone)]
pub struct OpenAiTextClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiTextClient {
    /// Client configured from `settings`, reading the key from `OPENAI_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamError` if the key is missing or the HTTP client
    /// cannot be built.
    #[tracing::instrument(skip_all)]
    pub fn from_settings(settings: &ModelSettings) -> TesseraResult<Self> {
        let api_key = http::credential(SERVICE, OPENAI_API_KEY)?;
        Self::with_api_key(api_key, settings)
    }

    /// Client with an explicit API key.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamError` if the HTTP client cannot be built.
    pub fn with_api_key(api_key: String, settings: &ModelSettings) -> TesseraResult<Self> {
        let client = http::client(
            SERVICE,
            Duration::from_secs(*settings.request_timeout_secs()),
        )?;
        Ok(Self {
            client,
            api_key,
            base_url: settings.openai_base_url().trim_end_matches('/').to_string(),
            model: settings.text_model().clone(),
        })
    }
}

#[async_trait]
impl TextBackend for OpenAiTextClient {
    #[tracing::instrument(skip(self, system_prompt, user_message), fields(model = %self.model))]
    async fn call(&self, system_prompt: &str, user_message: &str) -> TesseraResult<TextCompletion> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_message,
                },
            ],
        };
        tracing::debug!(url = %url, "Sending chat completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| http::transport(SERVICE, e))?;
        let response = http::check(SERVICE, response).await?;
        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| http::invalid(SERVICE, format!("Failed to parse response: {}", e)))?;

        let completion = into_completion(body)?;
        tracing::debug!(
            prompt_tokens = *completion.usage().prompt_tokens(),
            completion_tokens = *completion.usage().completion_tokens(),
            "Chat completion received"
        );
        Ok(completion)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_completion_reads_text_and_usage() {
        let response: ChatResponse = serde_json::from_str(
            r#"{
                "choices": [{"message": {"role": "assistant", "content": "  1\tBright ideas  \n"}}],
                "usage": {"prompt_tokens": 120, "completion_tokens": 40, "total_tokens": 160}
            }"#,
        )
        .unwrap();
        let completion = into_completion(response).unwrap();
        assert_eq!(completion.text(), "1\tBright ideas");
        assert_eq!(completion.usage().total(), 160);
    }

    #[test]
    fn test_into_completion_without_choices() {
        let response: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(into_completion(response).is_err());
    }

    #[test]
    fn test_missing_usage_counts_zero() {
        let response: ChatResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"content": "ok"}}]}"#).unwrap();
        assert_eq!(into_completion(response).unwrap().usage().total(), 0);
    }
}
