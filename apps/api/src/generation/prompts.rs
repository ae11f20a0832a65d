// Prompt constants and prompt assembly for test-case generation.
// Everything here is pure: no I/O, no validation, no hidden state.

use crate::generation::schemas::GenerateRequest;

/// System prompt for test-case generation. Declares persona, output schema,
/// and formatting rules. Sent unchanged with every request.
pub const SYSTEM_PROMPT: &str = r#"Persona:
You are a senior QA engineer and test-design expert. You convert user stories into precise, actionable test cases suitable for both manual execution and automation.

Goal:
Given a user story (title, acceptance criteria, optional description and additional info), produce a comprehensive, well-categorized set of test cases that cover Positive, Negative, Edge, Authorization, and Non-Functional scenarios as applicable.

Instructions (must follow exactly):
1. CRITICAL: Return ONLY a single valid JSON object that matches the exact "Output Schema" below. Do not include any prose, explanation, markdown, or additional keys outside the schema.
2. Use sequential zero-padded IDs: TC-001, TC-002, TC-003, ...
3. Each case must include: id, title, steps (array of short imperative strings), expectedResult, category. Include testData only when it adds value.
4. Steps must be concise, ordered, and actionable (use imperative verbs). Prefer using field names and UI elements from the provided story when possible.
5. Provide a balanced set of Positive, Negative, and Edge cases. Include Authorization and Non-Functional cases only if they are relevant to the story or acceptance criteria.
6. Keep titles short (~3–8 words). Expected results must be specific and measurable.
7. Do not invent functionality beyond the provided story, acceptance criteria, description, and additional info.

Context:
- Input will include:
  - Story Title
  - Acceptance Criteria (primary source for testability)
  - Description (optional)
  - Additional Information (optional)
- Focus strictly on testable behaviors described in the input.

Output Schema (exact — follow strictly):
{
  "cases": [
    {
      "id": "TC-001",
      "title": "string",
      "steps": ["string", "..."],
      "testData": "string (optional)",
      "expectedResult": "string",
      "category": "string (e.g., Positive|Negative|Edge|Authorization|Non-Functional)"
    }
  ],
  "model": "string (optional)",
  "promptTokens": 0,
  "completionTokens": 0
}

Tone and style:
- Precise, technical, concise.
- Use direct imperative verbs in steps.
- Avoid ambiguous or subjective language.

Examples (for reference only — DO NOT include these lines in your output):
Input:
Story Title: "User can reset password"
Acceptance Criteria:
- User clicks "Forgot password"
- User receives reset email with link
- Link allows user to set a new password meeting complexity rules

Valid JSON Output (must match schema):
{
  "cases": [
    {
      "id": "TC-001",
      "title": "Reset password - happy path",
      "steps": [
        "Open login page",
        "Click 'Forgot password' link",
        "Enter registered email and submit",
        "Open reset email and click reset link",
        "Enter new valid password and confirm",
        "Submit and verify success message"
      ],
      "testData": "email: registered@example.com; newPassword: ValidPass123!",
      "expectedResult": "User is able to set a new password and can login with the new password",
      "category": "Positive"
    },
    {
      "id": "TC-002",
      "title": "Reset link expired",
      "steps": [
        "Request password reset for registered email",
        "Wait until reset link expiry period elapses",
        "Open reset link"
      ],
      "expectedResult": "User sees an error indicating the reset link has expired and is prompted to request a new link",
      "category": "Negative"
    }
  ],
  "model": "string (optional)",
  "promptTokens": 0,
  "completionTokens": 0
}

Reminder: Return ONLY the JSON object matching the Output Schema. No additional text, no markup, no commentary."#;

/// Closing directive appended to every user prompt.
pub const TASK_DIRECTIVE: &str = "Task:\n\
    Following the SYSTEM prompt instructions, generate comprehensive test cases for the above user story. \
    Include Positive, Negative, and Edge cases and include Authorization or Non-Functional cases \
    only if they are implied by the acceptance criteria or additional info. \
    Use sequential IDs (TC-001...). \
    Return a single JSON object that exactly matches the Output Schema defined in the SYSTEM prompt. \
    Do NOT include any explanation or extra fields.";

/// The two halves of a chat-style completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptPair {
    pub system_prompt: &'static str,
    pub user_prompt: String,
}

/// Builds the user prompt for a story.
///
/// Sections are emitted in a fixed order, separated by blank lines:
/// title, acceptance criteria, description, additional information, task.
/// Absent or empty optional fields are skipped entirely. Field text is
/// copied verbatim.
pub fn build_prompt(request: &GenerateRequest) -> String {
    let mut prompt = format!(
        "User Story Input:\nStory Title: {}\n\nAcceptance Criteria:\n{}",
        request.story_title, request.acceptance_criteria
    );

    if let Some(description) = present(&request.description) {
        prompt.push_str("\n\nDescription:\n");
        prompt.push_str(description);
    }

    if let Some(additional_info) = present(&request.additional_info) {
        prompt.push_str("\n\nAdditional Information:\n");
        prompt.push_str(additional_info);
    }

    prompt.push_str("\n\n");
    prompt.push_str(TASK_DIRECTIVE);
    prompt
}

/// Pairs the fixed system prompt with the user prompt for `request`.
pub fn build_prompt_pair(request: &GenerateRequest) -> PromptPair {
    PromptPair {
        system_prompt: SYSTEM_PROMPT,
        user_prompt: build_prompt(request),
    }
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}
