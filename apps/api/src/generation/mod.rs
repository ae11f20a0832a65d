// Test-case generation: prompt assembly, the LLM call, and validation of
// the model's JSON. All LLM calls go through llm_client.

pub mod generator;
pub mod handlers;
pub mod prompts;
pub mod response_parser;
pub mod schemas;
