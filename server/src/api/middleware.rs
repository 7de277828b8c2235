//! HTTP middleware (CORS, 404 handler)

use axum::Json;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tower_http::cors::CorsLayer;

/// Permissive CORS for browser clients.
///
/// Applied as an outer layer so error responses carry the same cross-origin
/// headers as successes; otherwise browsers report failed requests as
/// opaque network errors instead of surfacing the error body.
pub fn cors() -> CorsLayer {
    CorsLayer::permissive()
}

/// Handle 404 Not Found with logging
pub async fn handle_404(req: Request) -> impl IntoResponse {
    tracing::debug!(method = %req.method(), uri = %req.uri(), "[404]");
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": "not found",
            "code": "NOT_FOUND",
        })),
    )
}
