//! Axum route handlers for the Generation API.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::generator::generate_test_cases;
use crate::generation::schemas::{GenerateRequest, GenerateResponse};
use crate::state::AppState;

/// POST /api/v1/test-cases/generate
///
/// Validates the story, then runs the generation pipeline.
/// Malformed bodies are reported through the same error envelope as blank fields.
pub async fn handle_generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    request.validate()?;

    let span = info_span!("generate", request_id = %Uuid::new_v4());
    let response = generate_test_cases(state.llm.as_ref(), &request)
        .instrument(span)
        .await?;

    Ok(Json(response))
}
