//! Response Parser: turns raw model text into a validated `GenerateResponse`.
//!
//! Enforces the contract the system prompt asks for: a single JSON object,
//! at least one case, IDs `TC-001`, `TC-002`, ... in order, and non-blank
//! required fields on every case.

use thiserror::Error;
use tracing::warn;

use crate::generation::schemas::GenerateResponse;
use crate::llm_client::strip_json_fences;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("output is not valid test-case JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("output contains no test cases")]
    NoCases,

    #[error("case #{position} has id '{found}', expected '{expected}'")]
    NonSequentialId {
        position: usize,
        expected: String,
        found: String,
    },

    #[error("case {id} is missing {field}")]
    MissingField { id: String, field: &'static str },
}

/// Expected identifier for the case at zero-based `index`.
pub fn case_id(index: usize) -> String {
    format!("TC-{:03}", index + 1)
}

/// Parses and validates the model's raw text output.
pub fn parse_generate_response(text: &str) -> Result<GenerateResponse, ParseError> {
    let response: GenerateResponse = serde_json::from_str(strip_json_fences(text))?;

    if response.cases.is_empty() {
        return Err(ParseError::NoCases);
    }

    for (index, case) in response.cases.iter().enumerate() {
        let expected = case_id(index);
        if case.id != expected {
            return Err(ParseError::NonSequentialId {
                position: index + 1,
                expected,
                found: case.id.clone(),
            });
        }

        let missing = if case.title.trim().is_empty() {
            Some("title")
        } else if case.steps.is_empty() || case.steps.iter().all(|s| s.trim().is_empty()) {
            Some("steps")
        } else if case.expected_result.trim().is_empty() {
            Some("expectedResult")
        } else if case.category.trim().is_empty() {
            Some("category")
        } else {
            None
        };

        if let Some(field) = missing {
            return Err(ParseError::MissingField {
                id: case.id.clone(),
                field,
            });
        }

        if !case.has_known_category() {
            warn!("Case {} has unrecognised category {:?}", case.id, case.category);
        }
    }

    Ok(response)
}
