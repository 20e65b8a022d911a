//! Axum route handler for study guide generation.

use axum::{body::Bytes, extract::State, Json};
use tracing::info;

use crate::errors::AppError;
use crate::state::AppState;
use crate::study_guide::models::{StudyGuideRequest, StudyGuideResponse};

/// POST /generate-study-guide
///
/// The body is parsed leniently: anything that is not a JSON object counts as
/// a request with every field absent. Never rejects input.
pub async fn handle_generate_study_guide(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<StudyGuideResponse>, AppError> {
    let params = StudyGuideRequest::from_body(&body).resolve();
    info!(
        "Generating study guide: class={:?} unit={:?} year={:?} backend={}",
        params.class,
        params.unit,
        params.year,
        state.generator.backend()
    );

    let guide = state.generator.generate(&params).await?;
    if guide.is_empty() {
        return Err(AppError::EmptyGuide);
    }

    Ok(Json(StudyGuideResponse {
        success: true,
        content: guide.into_string(),
    }))
}
