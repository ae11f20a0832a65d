//! Test-case generation pipeline.
//!
//! Flow: build prompt pair → one completion call → parse and validate →
//! stamp model and token usage from the provider.

use tracing::info;

use crate::errors::AppError;
use crate::generation::prompts::build_prompt_pair;
use crate::generation::response_parser::parse_generate_response;
use crate::generation::schemas::{GenerateRequest, GenerateResponse};
use crate::llm_client::CompletionProvider;

/// Generates test cases for a story that has already passed validation.
///
/// `model`, `promptTokens` and `completionTokens` always reflect what the
/// provider reported, whatever the model wrote into those keys.
pub async fn generate_test_cases(
    llm: &dyn CompletionProvider,
    request: &GenerateRequest,
) -> Result<GenerateResponse, AppError> {
    let prompts = build_prompt_pair(request);

    let completion = llm
        .complete(prompts.system_prompt, &prompts.user_prompt)
        .await
        .map_err(|e| AppError::Llm(format!("Test-case generation call failed: {e}")))?;

    let mut response = parse_generate_response(&completion.text)
        .map_err(|e| AppError::InvalidModelOutput(e.to_string()))?;

    response.model = Some(completion.model);
    response.prompt_tokens = Some(completion.input_tokens);
    response.completion_tokens = Some(completion.output_tokens);

    info!(
        "Generated {} test cases for story {:?} (prompt_tokens={}, completion_tokens={})",
        response.cases.len(),
        request.story_title,
        completion.input_tokens,
        completion.output_tokens
    );

    Ok(response)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::generation::prompts::SYSTEM_PROMPT;
    use crate::llm_client::{Completion, LlmError};

    pub(crate) const MODEL_OUTPUT: &str = r#"{
        "cases": [
            {
                "id": "TC-001",
                "title": "Reset password - happy path",
                "steps": ["Open login page", "Request reset", "Set new password"],
                "expectedResult": "User logs in with the new password",
                "category": "Positive"
            }
        ],
        "model": "string (optional)",
        "promptTokens": 0,
        "completionTokens": 0
    }"#;

    /// Returns a canned answer and records the prompts it was given.
    pub(crate) struct StubProvider {
        pub answer: Result<String, u16>,
        pub seen: Mutex<Vec<(String, String)>>,
    }

    impl StubProvider {
        pub(crate) fn answering(text: &str) -> Self {
            Self {
                answer: Ok(text.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn failing(status: u16) -> Self {
            Self {
                answer: Err(status),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CompletionProvider for StubProvider {
        async fn complete(&self, system: &str, prompt: &str) -> Result<Completion, LlmError> {
            self.seen
                .lock()
                .unwrap()
                .push((system.to_string(), prompt.to_string()));
            match &self.answer {
                Ok(text) => Ok(Completion {
                    text: text.clone(),
                    model: "claude-sonnet-4-5-20250929".to_string(),
                    input_tokens: 1200,
                    output_tokens: 340,
                }),
                Err(status) => Err(LlmError::Api {
                    status: *status,
                    message: "overloaded".to_string(),
                }),
            }
        }
    }

    fn story() -> GenerateRequest {
        GenerateRequest {
            story_title: "User can reset password".to_string(),
            acceptance_criteria: "User receives reset email".to_string(),
            description: Some("Applies to all registered users".to_string()),
            additional_info: None,
        }
    }

    #[tokio::test]
    async fn test_sends_prompt_pair_to_provider() {
        let provider = StubProvider::answering(MODEL_OUTPUT);
        generate_test_cases(&provider, &story()).await.unwrap();

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, SYSTEM_PROMPT);
        assert!(seen[0].1.contains("Story Title: User can reset password"));
        assert!(seen[0].1.contains("Description:\nApplies to all registered users"));
    }

    #[tokio::test]
    async fn test_stamps_provider_usage() {
        let provider = StubProvider::answering(MODEL_OUTPUT);
        let response = generate_test_cases(&provider, &story()).await.unwrap();

        assert_eq!(response.cases.len(), 1);
        assert_eq!(response.model.as_deref(), Some("claude-sonnet-4-5-20250929"));
        assert_eq!(response.prompt_tokens, Some(1200));
        assert_eq!(response.completion_tokens, Some(340));
    }

    #[tokio::test]
    async fn test_provider_failure_is_llm_error() {
        let provider = StubProvider::failing(529);
        let err = generate_test_cases(&provider, &story()).await.unwrap_err();
        assert!(matches!(err, AppError::Llm(ref m) if m.contains("529")));
    }

    #[tokio::test]
    async fn test_malformed_output_is_rejected() {
        let provider = StubProvider::answering("Sure! Here are some test cases.");
        let err = generate_test_cases(&provider, &story()).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidModelOutput(_)));
    }
}
