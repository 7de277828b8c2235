//! Shared API types
//!
//! Error responses carry a human-readable `error` string plus a stable
//! `code`, and are emitted through the normal response path so the CORS
//! layer applies to failures exactly as it does to successes.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::data::{ProfileError, UpstreamError};
use crate::domain::{LessonError, QuizError};

/// Standard API error response
#[derive(Debug)]
pub enum ApiError {
    /// Request could not be served (500)
    Internal { code: &'static str, message: String },
    /// The generation pipeline could not be reached (503)
    ServiceUnavailable { code: &'static str, message: String },
    /// The generation pipeline did not answer in time (504)
    GatewayTimeout { code: &'static str, message: String },
    /// The generation pipeline answered with an error status, passed through
    Upstream { status: u16, message: String },
}

impl ApiError {
    pub fn internal(code: &'static str, message: impl Into<String>) -> Self {
        Self::Internal {
            code,
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::GatewayTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            Self::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Internal { code, .. }
            | Self::ServiceUnavailable { code, .. }
            | Self::GatewayTimeout { code, .. } => code,
            Self::Upstream { .. } => "UPSTREAM_ERROR",
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::Internal { message, .. }
            | Self::ServiceUnavailable { message, .. }
            | Self::GatewayTimeout { message, .. }
            | Self::Upstream { message, .. } => message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            Json(serde_json::json!({
                "error": self.message(),
                "code": self.code(),
            })),
        )
            .into_response()
    }
}

impl From<UpstreamError> for ApiError {
    fn from(e: UpstreamError) -> Self {
        tracing::error!(error = %e, "Pipeline call failed");
        match &e {
            UpstreamError::Connect(_) => Self::ServiceUnavailable {
                code: "UPSTREAM_UNAVAILABLE",
                message: e.to_string(),
            },
            UpstreamError::Timeout { .. } => Self::GatewayTimeout {
                code: "UPSTREAM_TIMEOUT",
                message: e.to_string(),
            },
            UpstreamError::Status { status, .. } => Self::Upstream {
                status: *status,
                message: e.to_string(),
            },
            UpstreamError::MalformedResponse { .. } => Self::Internal {
                code: "UPSTREAM_MALFORMED_RESPONSE",
                message: e.to_string(),
            },
        }
    }
}

impl From<LessonError> for ApiError {
    fn from(e: LessonError) -> Self {
        tracing::error!(error = %e, "Lesson reconciliation failed");
        let code = match &e {
            LessonError::IncompleteResult { .. } => "INCOMPLETE_RESULT",
            LessonError::MissingOutput { .. } => "MISSING_OUTPUT",
            LessonError::MalformedJson { .. } => "MALFORMED_JSON",
            LessonError::SegmentsNotList { .. } => "SEGMENTS_NOT_LIST",
            LessonError::SegmentsEmpty { .. } => "SEGMENTS_EMPTY",
            LessonError::NoAudioFound => "NO_AUDIO_FOUND",
            LessonError::NoValidSegments => "NO_VALID_SEGMENTS",
        };
        Self::Internal {
            code,
            message: e.to_string(),
        }
    }
}

impl From<QuizError> for ApiError {
    fn from(e: QuizError) -> Self {
        tracing::error!(error = %e, "Quiz extraction failed");
        let code = match &e {
            QuizError::MalformedJson { .. } => "MALFORMED_JSON",
            QuizError::NoQuizArray => "NO_QUIZ_ARRAY",
            QuizError::NoValidQuestions => "NO_VALID_QUESTIONS",
        };
        Self::Internal {
            code,
            message: e.to_string(),
        }
    }
}

impl From<ProfileError> for ApiError {
    fn from(e: ProfileError) -> Self {
        tracing::error!(error = %e, "Profile store call failed");
        Self::Internal {
            code: "PROFILE_ERROR",
            message: e.to_string(),
        }
    }
}
