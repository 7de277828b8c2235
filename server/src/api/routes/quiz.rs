//! Quiz generation endpoint

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::types::ApiError;
use crate::data::{PipelineClient, ProfileClient};
use crate::domain::QuizQuestion;
use crate::domain::quiz;

/// Section header the profile store uses for quiz-history summaries; the
/// useful observations follow it.
const OBSERVATION_MARKER: &str = "Key Observations & Learning Patterns\n\n###";

// ============================================================================
// State
// ============================================================================

#[derive(Clone)]
pub struct QuizApiState {
    pub pipeline: Arc<PipelineClient>,
    pub profile: Option<Arc<ProfileClient>>,
}

// ============================================================================
// Request/Response DTOs
// ============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GenerateQuizRequest {
    /// The lesson prompt the quiz should cover
    #[serde(rename = "userInput")]
    #[validate(length(min = 1, max = 4000))]
    pub user_input: String,
    /// Profile-store user id for personalization (optional)
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuizResponse {
    pub questions: Vec<QuizQuestion>,
}

// ============================================================================
// Routes
// ============================================================================

pub fn routes(pipeline: Arc<PipelineClient>, profile: Option<Arc<ProfileClient>>) -> Router<()> {
    let state = QuizApiState { pipeline, profile };
    Router::new()
        .route("/generateQuiz", post(generate_quiz))
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

/// Generate a quiz for a lesson prompt.
#[utoipa::path(
    post,
    path = "/generateQuiz",
    tag = "quiz",
    request_body = GenerateQuizRequest,
    responses(
        (status = 200, description = "Formatted quiz", body = QuizResponse),
        (status = 500, description = "Quiz payload could not be extracted"),
        (status = 503, description = "Pipeline unreachable"),
        (status = 504, description = "Pipeline timed out")
    )
)]
pub async fn generate_quiz(
    State(state): State<QuizApiState>,
    ValidatedJson(req): ValidatedJson<GenerateQuizRequest>,
) -> Result<Json<QuizResponse>, ApiError> {
    tracing::info!(
        user_input = %req.user_input,
        personalized = req.user_id.is_some(),
        "Received quiz generation request"
    );

    let context = quiz_context(
        state.profile.as_deref(),
        req.user_id.as_deref(),
        &req.user_input,
    )
    .await;

    let payload = quiz_prompt(&context, &req.user_input);
    let result = state.pipeline.run_quiz(&payload).await?;
    let questions = quiz::extract_quiz_from_result(&result)?;

    tracing::info!(questions = questions.len(), "Returning quiz");
    Ok(Json(QuizResponse { questions }))
}

/// Fetch quiz-history context for the learner; empty on any failure.
async fn quiz_context(
    profile: Option<&ProfileClient>,
    user_id: Option<&str>,
    user_input: &str,
) -> String {
    let (Some(profile), Some(user_id)) = (profile, user_id) else {
        tracing::info!("No profile user id, skipping quiz personalization");
        return String::new();
    };

    match profile
        .query(user_id, &quiz_context_question(user_input), false)
        .await
    {
        Ok(Some(answer)) => extract_observations(&answer),
        Ok(None) => String::new(),
        Err(e) => {
            tracing::warn!(user_id, error = %e, "Profile query failed, using empty quiz context");
            String::new()
        }
    }
}

fn quiz_context_question(user_input: &str) -> String {
    format!(
        "answer in 4-5 lines : What were the key observations from previous quizzes related to {user_input} \
         Please provide detailed insights about what the user struggled with, any patterns in their \
         learning performance related to this topic."
    )
}

/// Pull the observations section out of a profile answer, falling back to
/// the whole answer when the marker is absent.
fn extract_observations(answer: &str) -> String {
    match answer.find(OBSERVATION_MARKER) {
        Some(index) => answer[index + OBSERVATION_MARKER.len()..].trim().to_string(),
        None => {
            tracing::warn!("Observation marker not found in profile answer, using full answer");
            answer.trim().to_string()
        }
    }
}

/// The quiz pipeline takes its input as a JSON document embedded in the
/// prompt field.
fn quiz_prompt(user_pref_context: &str, user_input: &str) -> String {
    json!({
        "user_pref_context": user_pref_context,
        "user_input": user_input,
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_observations_extracted_after_marker() {
        let answer = format!(
            "Intro text\n{} The learner confuses magma and lava.",
            OBSERVATION_MARKER
        );
        assert_eq!(
            extract_observations(&answer),
            "The learner confuses magma and lava."
        );
    }

    #[test]
    fn test_full_answer_used_when_marker_absent() {
        assert_eq!(
            extract_observations("  plain summary  "),
            "plain summary"
        );
    }

    #[test]
    fn test_quiz_prompt_is_json_document() {
        let prompt = quiz_prompt("ctx", "volcanoes");
        let parsed: Value = serde_json::from_str(&prompt).unwrap();
        assert_eq!(parsed["user_pref_context"], "ctx");
        assert_eq!(parsed["user_input"], "volcanoes");
    }

    #[test]
    fn test_quiz_context_question_embeds_topic() {
        let question = quiz_context_question("volcanoes");
        assert!(question.contains("related to volcanoes"));
    }

    #[tokio::test]
    async fn test_context_empty_without_profile_client() {
        let context = quiz_context(None, Some("user-1"), "volcanoes").await;
        assert!(context.is_empty());
    }
}
