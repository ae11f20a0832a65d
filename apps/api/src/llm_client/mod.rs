//! LLM Client: the single point of entry for all model calls in the service.
//!
//! No other module may call the Anthropic API directly. Handlers and the
//! generator depend on the `CompletionProvider` trait, which `LlmClient`
//! implements against the Messages API.
//!
//! Calls are made exactly once. Retry and rate limiting belong to whoever
//! fronts this service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all test-case generation calls.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 4096;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Text returned by a completion call, with the usage the provider reported.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub model: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Anything that can answer a system + user prompt pair with model text.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<Completion, LlmError>;
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    #[serde(default)]
    pub model: Option<String>,
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }

    fn into_completion(self) -> Result<Completion, LlmError> {
        let text = self
            .text()
            .filter(|t| !t.trim().is_empty())
            .ok_or(LlmError::EmptyContent)?
            .to_string();

        Ok(Completion {
            text,
            model: self.model.unwrap_or_else(|| MODEL.to_string()),
            input_tokens: self.usage.input_tokens,
            output_tokens: self.usage.output_tokens,
        })
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Wraps the Anthropic Messages API.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
        })
    }

    /// Makes a raw call to the Messages API, returning the full response object.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<LlmResponse, LlmError> {
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let llm_response: LlmResponse = response.json().await?;

        debug!(
            "LLM call succeeded: input_tokens={}, output_tokens={}",
            llm_response.usage.input_tokens, llm_response.usage.output_tokens
        );

        Ok(llm_response)
    }
}

#[async_trait]
impl CompletionProvider for LlmClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<Completion, LlmError> {
        self.call(prompt, system).await?.into_completion()
    }
}

/// Strips a surrounding ``` code fence from LLM output, whatever its info
/// string (`json`, `JSON`, none). Unfenced text is only trimmed.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(after_fence) = text.strip_prefix("```") else {
        return text;
    };

    // Info string runs to the end of the opening line.
    let body = match after_fence.find('\n') {
        Some(newline) => &after_fence[newline + 1..],
        None => after_fence.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };

    let body = body.trim();
    body.strip_suffix("```").map(str::trim).unwrap_or(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"cases\": []}\n```";
        assert_eq!(strip_json_fences(input), "{\"cases\": []}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"cases\": []}\n```";
        assert_eq!(strip_json_fences(input), "{\"cases\": []}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "  {\"cases\": []}\n";
        assert_eq!(strip_json_fences(input), "{\"cases\": []}");
    }

    #[test]
    fn test_strip_json_fences_uppercase_tag() {
        let input = "```JSON\n{\"cases\": []}\n```";
        assert_eq!(strip_json_fences(input), "{\"cases\": []}");
    }

    #[test]
    fn test_strip_json_fences_other_info_string() {
        let input = "```jsonc  \r\n{\"cases\": []}\r\n```\n";
        assert_eq!(strip_json_fences(input), "{\"cases\": []}");
    }

    #[test]
    fn test_strip_json_fences_single_line() {
        let input = "```json{\"cases\": []}```";
        assert_eq!(strip_json_fences(input), "{\"cases\": []}");
    }

    #[test]
    fn test_strip_json_fences_unterminated() {
        let input = "```json\n{\"cases\": []}";
        assert_eq!(strip_json_fences(input), "{\"cases\": []}");
    }

    #[test]
    fn test_response_into_completion_uses_first_text_block() {
        let json = r#"{
            "model": "claude-sonnet-4-5-20250929",
            "content": [
                {"type": "thinking", "text": null},
                {"type": "text", "text": "{\"cases\": []}"}
            ],
            "usage": {"input_tokens": 812, "output_tokens": 240}
        }"#;
        let response: LlmResponse = serde_json::from_str(json).unwrap();
        let completion = response.into_completion().unwrap();

        assert_eq!(completion.text, "{\"cases\": []}");
        assert_eq!(completion.model, "claude-sonnet-4-5-20250929");
        assert_eq!(completion.input_tokens, 812);
        assert_eq!(completion.output_tokens, 240);
    }

    #[test]
    fn test_response_without_model_falls_back_to_constant() {
        let json = r#"{
            "content": [{"type": "text", "text": "{}"}],
            "usage": {"input_tokens": 1, "output_tokens": 1}
        }"#;
        let response: LlmResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.into_completion().unwrap().model, MODEL);
    }

    #[test]
    fn test_blank_text_is_empty_content() {
        let json = r#"{
            "content": [{"type": "text", "text": "   "}],
            "usage": {"input_tokens": 1, "output_tokens": 0}
        }"#;
        let response: LlmResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(
            response.into_completion(),
            Err(LlmError::EmptyContent)
        ));
    }

    #[test]
    fn test_request_body_shape() {
        let body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system: "system text",
            messages: vec![AnthropicMessage {
                role: "user",
                content: "user text",
            }],
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["system"], "system text");
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"], "user text");
        assert_eq!(value["max_tokens"], 4096);
    }
}
