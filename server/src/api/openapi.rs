//! OpenAPI specification and Swagger UI

use axum::http::header;
use axum::response::{Html, IntoResponse, Json};
use utoipa::OpenApi;

use crate::api::routes::{health, lesson, personalization, quiz};
use crate::domain::lesson::CombinedSegment;
use crate::domain::quiz::QuizQuestion;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Lessonsmith API",
        version = env!("CARGO_PKG_VERSION"),
        description = "AI lesson generation relay"
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "lesson", description = "Lesson generation"),
        (name = "quiz", description = "Quiz generation"),
        (name = "personalization", description = "Learner profile store relays")
    ),
    paths(
        // Health
        health::health,
        // Lesson
        lesson::generate_lesson,
        // Quiz
        quiz::generate_quiz,
        // Personalization
        personalization::register_user,
        personalization::ingest_lesson,
        personalization::ingest_quiz,
    ),
    components(schemas(
        // Health
        health::HealthResponse,
        // Lesson
        lesson::GenerateLessonRequest,
        lesson::LessonResponse,
        CombinedSegment,
        // Quiz
        quiz::GenerateQuizRequest,
        quiz::QuizResponse,
        QuizQuestion,
        // Personalization
        personalization::RegisterRequest,
        personalization::RegisterResponse,
        personalization::IngestLessonRequest,
        personalization::IngestQuizRequest,
        personalization::IngestResponse,
    ))
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
pub async fn openapi_json() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        Json(ApiDoc::openapi()),
    )
}

/// Serve Swagger UI from CDN
pub async fn swagger_ui_html() -> Html<&'static str> {
    Html(SWAGGER_UI_HTML)
}

const SWAGGER_UI_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Lessonsmith API Documentation</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
    <style>
        html { box-sizing: border-box; overflow-y: scroll; }
        *, *:before, *:after { box-sizing: inherit; }
        body { margin: 0; background: #fafafa; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = () => {
            window.ui = SwaggerUIBundle({
                url: "/api/openapi.json",
                dom_id: '#swagger-ui',
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                layout: "StandaloneLayout",
                deepLinking: true
            });
        };
    </script>
</body>
</html>"#;
