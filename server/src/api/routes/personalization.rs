//! Personalization endpoints
//!
//! Thin relays to the learner profile store: registration plus lesson and
//! quiz ingestion. The frontend calls these directly; the lesson/quiz flows
//! additionally ingest and query on their own.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::types::ApiError;
use crate::data::{ProfileClient, QuizOutcome};

// ============================================================================
// State
// ============================================================================

#[derive(Clone)]
pub struct PersonalizationApiState {
    pub profile: Option<Arc<ProfileClient>>,
}

// ============================================================================
// Request/Response DTOs
// ============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub age: u32,
    #[validate(length(min = 1, max = 100))]
    pub tone: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub user_id: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct IngestLessonRequest {
    #[validate(length(min = 1, max = 256))]
    pub user_id: String,
    #[validate(length(min = 1, max = 4000))]
    pub topic: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct IngestQuizRequest {
    #[validate(length(min = 1, max = 256))]
    pub user_id: String,
    #[validate(length(min = 1, max = 4000))]
    pub topic: String,
    #[validate(length(min = 1))]
    pub question: String,
    pub answer: String,
    pub user_answer: String,
    /// "correct" or "wrong"
    pub verdict: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IngestResponse {
    pub success: bool,
    pub message: String,
}

// ============================================================================
// Routes
// ============================================================================

pub fn routes(profile: Option<Arc<ProfileClient>>) -> Router<()> {
    let state = PersonalizationApiState { profile };
    Router::new()
        .route("/personalization/register", post(register_user))
        .route("/personalization/ingest/lesson", post(ingest_lesson))
        .route("/personalization/ingest/quiz", post(ingest_quiz))
        .with_state(state)
}

fn not_configured() -> ApiError {
    ApiError::internal(
        "PROFILE_NOT_CONFIGURED",
        "Personalization is not configured on this server",
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Register a learner with the profile store
#[utoipa::path(
    post,
    path = "/personalization/register",
    tag = "personalization",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Learner registered", body = RegisterResponse),
        (status = 500, description = "Registration failed")
    )
)]
pub async fn register_user(
    State(state): State<PersonalizationApiState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let profile = state.profile.as_deref().ok_or_else(not_configured)?;

    tracing::info!(email = %req.email, "Registering learner");
    let user_id = profile
        .register(&req.email, &req.name, req.age, &req.tone)
        .await?;

    tracing::info!(user_id = %user_id, "Learner registered");
    Ok(Json(RegisterResponse { user_id }))
}

/// Ingest a lesson prompt into the learner's history.
/// Failures are reported in-band; the frontend treats them as advisory.
#[utoipa::path(
    post,
    path = "/personalization/ingest/lesson",
    tag = "personalization",
    request_body = IngestLessonRequest,
    responses(
        (status = 200, description = "Ingestion result", body = IngestResponse)
    )
)]
pub async fn ingest_lesson(
    State(state): State<PersonalizationApiState>,
    ValidatedJson(req): ValidatedJson<IngestLessonRequest>,
) -> Json<IngestResponse> {
    let Some(profile) = state.profile.as_deref() else {
        return Json(IngestResponse {
            success: false,
            message: "Personalization is not configured".into(),
        });
    };

    match profile.ingest_lesson(&req.user_id, &req.topic).await {
        Ok(()) => Json(IngestResponse {
            success: true,
            message: "Lesson data ingested successfully".into(),
        }),
        Err(e) => {
            tracing::warn!(user_id = %req.user_id, error = %e, "Lesson ingestion failed");
            Json(IngestResponse {
                success: false,
                message: "Failed to ingest lesson data".into(),
            })
        }
    }
}

/// Ingest a graded quiz answer into the learner's history
#[utoipa::path(
    post,
    path = "/personalization/ingest/quiz",
    tag = "personalization",
    request_body = IngestQuizRequest,
    responses(
        (status = 200, description = "Ingestion result", body = IngestResponse)
    )
)]
pub async fn ingest_quiz(
    State(state): State<PersonalizationApiState>,
    ValidatedJson(req): ValidatedJson<IngestQuizRequest>,
) -> Json<IngestResponse> {
    let Some(profile) = state.profile.as_deref() else {
        return Json(IngestResponse {
            success: false,
            message: "Personalization is not configured".into(),
        });
    };

    let outcome = QuizOutcome {
        topic: req.topic,
        question: req.question,
        answer: req.answer,
        user_answer: req.user_answer,
        verdict: req.verdict,
    };

    match profile.ingest_quiz(&req.user_id, &outcome).await {
        Ok(()) => Json(IngestResponse {
            success: true,
            message: "Quiz data ingested successfully".into(),
        }),
        Err(e) => {
            tracing::warn!(user_id = %req.user_id, error = %e, "Quiz ingestion failed");
            Json(IngestResponse {
                success: false,
                message: "Failed to ingest quiz data".into(),
            })
        }
    }
}
