//! Wire types for the test-case generation API.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// A user story submitted for test-case generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub story_title: String,
    /// Primary source for testability.
    pub acceptance_criteria: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
}

impl GenerateRequest {
    /// Rejects requests whose required fields are blank.
    ///
    /// The prompt builder never validates; callers run this first.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.story_title.trim().is_empty() {
            return Err(AppError::Validation(
                "storyTitle cannot be empty".to_string(),
            ));
        }
        if self.acceptance_criteria.trim().is_empty() {
            return Err(AppError::Validation(
                "acceptanceCriteria cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// One verifiable scenario produced by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    /// `TC-` followed by a 3-digit zero-padded sequence number.
    pub id: String,
    pub title: String,
    pub steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_data: Option<String>,
    pub expected_result: String,
    pub category: String,
}

/// Test-case categories the system prompt asks for.
pub const KNOWN_CATEGORIES: &[&str] = &[
    "Positive",
    "Negative",
    "Edge",
    "Authorization",
    "Non-Functional",
];

impl TestCase {
    pub fn has_known_category(&self) -> bool {
        KNOWN_CATEGORIES.contains(&self.category.as_str())
    }
}

/// Top-level object the model must return, also the API response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub cases: Vec<TestCase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_tokens: Option<u32>,
}
