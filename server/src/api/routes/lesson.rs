//! Lesson generation endpoint

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::types::ApiError;
use crate::data::{PipelineClient, ProfileClient};
use crate::domain::CombinedSegment;
use crate::domain::lesson;

// ============================================================================
// State
// ============================================================================

#[derive(Clone)]
pub struct LessonApiState {
    pub pipeline: Arc<PipelineClient>,
    pub profile: Option<Arc<ProfileClient>>,
}

// ============================================================================
// Request/Response DTOs
// ============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GenerateLessonRequest {
    /// Lesson topic or prompt from the client
    #[serde(rename = "userInput")]
    #[validate(length(min = 1, max = 4000))]
    pub user_input: String,
    /// Profile-store user id for personalization (optional)
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LessonResponse {
    pub topic: String,
    pub segments: Vec<CombinedSegment>,
}

// ============================================================================
// Routes
// ============================================================================

pub fn routes(pipeline: Arc<PipelineClient>, profile: Option<Arc<ProfileClient>>) -> Router<()> {
    let state = LessonApiState { pipeline, profile };
    Router::new()
        .route("/generateLesson", post(generate_lesson))
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

/// Generate a lesson: relay the (optionally personalized) prompt to the
/// generation pipeline and reconcile its two result streams into segments.
#[utoipa::path(
    post,
    path = "/generateLesson",
    tag = "lesson",
    request_body = GenerateLessonRequest,
    responses(
        (status = 200, description = "Assembled lesson", body = LessonResponse),
        (status = 500, description = "Pipeline response could not be reconciled"),
        (status = 503, description = "Pipeline unreachable"),
        (status = 504, description = "Pipeline timed out")
    )
)]
pub async fn generate_lesson(
    State(state): State<LessonApiState>,
    ValidatedJson(req): ValidatedJson<GenerateLessonRequest>,
) -> Result<Json<LessonResponse>, ApiError> {
    tracing::info!(
        user_input = %req.user_input,
        personalized = req.user_id.is_some(),
        "Received lesson generation request"
    );

    let prompt = enrich_lesson_prompt(
        state.profile.as_deref(),
        req.user_id.as_deref(),
        &req.user_input,
    )
    .await;

    let slots = state.pipeline.run_lesson(&prompt).await?;
    let built = lesson::build_lesson(&slots, &req.user_input)?;

    tracing::info!(
        topic = %built.topic,
        segments = built.segments.len(),
        skipped = built.report.skipped.len(),
        "Returning lesson"
    );

    Ok(Json(LessonResponse {
        topic: built.topic,
        segments: built.segments,
    }))
}

/// Enrich the prompt with learning-history context. Every profile-store
/// failure degrades to the unmodified prompt; personalization is never a
/// reason to fail a lesson request.
async fn enrich_lesson_prompt(
    profile: Option<&ProfileClient>,
    user_id: Option<&str>,
    user_input: &str,
) -> String {
    let (Some(profile), Some(user_id)) = (profile, user_id) else {
        tracing::info!("No profile user id, skipping personalization");
        return user_input.to_string();
    };

    if let Err(e) = profile.ingest_lesson(user_id, user_input).await {
        tracing::warn!(user_id, error = %e, "Lesson prompt ingestion failed, continuing");
    }

    match profile
        .query(user_id, &lesson_context_question(user_input), false)
        .await
    {
        Ok(Some(answer)) => {
            tracing::info!(user_id, "Enhanced prompt with learning-history context");
            format!("{user_input}\n\nRelevant past learning context:\n{answer}")
        }
        Ok(None) => user_input.to_string(),
        Err(e) => {
            tracing::warn!(user_id, error = %e, "Profile query failed, using original prompt");
            user_input.to_string()
        }
    }
}

/// The topic goes in unquoted: the profile store cannot resolve quoted text.
fn lesson_context_question(user_input: &str) -> String {
    format!(
        "What past learning experiences, quiz results, and key observations are related to {user_input}? \
         Please provide insights about what the user has learned, struggled with, and any patterns \
         in their learning performance related to this topic that would help personalize the lesson."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_question_embeds_topic_unquoted() {
        let question = lesson_context_question("plate tectonics");
        assert!(question.contains("related to plate tectonics?"));
        assert!(!question.contains('"'));
    }

    #[tokio::test]
    async fn test_prompt_unchanged_without_profile_client() {
        let prompt = enrich_lesson_prompt(None, Some("user-1"), "volcanoes").await;
        assert_eq!(prompt, "volcanoes");
    }

    #[test]
    fn test_request_accepts_camel_case_input() {
        let req: GenerateLessonRequest =
            serde_json::from_str(r#"{"userInput": "volcanoes", "user_id": "u-1"}"#).unwrap();
        assert_eq!(req.user_input, "volcanoes");
        assert_eq!(req.user_id.as_deref(), Some("u-1"));
    }

    #[test]
    fn test_request_user_id_optional() {
        let req: GenerateLessonRequest =
            serde_json::from_str(r#"{"userInput": "volcanoes"}"#).unwrap();
        assert!(req.user_id.is_none());
    }

    #[test]
    fn test_empty_input_fails_validation() {
        let req: GenerateLessonRequest = serde_json::from_str(r#"{"userInput": ""}"#).unwrap();
        assert!(req.validate().is_err());
    }
}
