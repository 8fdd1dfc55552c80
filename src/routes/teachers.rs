use actix_web::{error, http::header, http::Method, web, HttpRequest, HttpResponse, Responder};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use crate::core::TeacherMatcher;
use crate::models::{ErrorResponse, HealthResponse, MatchTeachersRequest};

/// Headers browsers may send to the match endpoint
pub const ALLOWED_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub matcher: Arc<TeacherMatcher>,
}

/// Configure all teacher-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/teachers/match", web::post().to(match_teachers))
        .route("/teachers/match", web::method(Method::OPTIONS).to(preflight));
}

/// JSON extractor config that reports malformed bodies as `{ "error": ... }`
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(handle_json_payload_error)
}

fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    let response = HttpResponse::BadRequest()
        .insert_header((header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
        .json(ErrorResponse::new(format!("Invalid JSON: {}", err)));
    error::InternalError::from_response(err, response).into()
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = state.matcher.store().health_check().await;

    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Answer a pre-flight request with an empty body and permissive headers
async fn preflight() -> impl Responder {
    HttpResponse::Ok()
        .insert_header((header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
        .insert_header((header::ACCESS_CONTROL_ALLOW_HEADERS, ALLOWED_HEADERS))
        .insert_header((header::ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"))
        .finish()
}

/// Match teachers endpoint
///
/// POST /api/v1/teachers/match
///
/// Request body:
/// ```json
/// { "skill": "python" }
/// ```
///
/// Responds with `{ "teachers": [...] }` ordered by rank, or
/// `{ "error": "..." }` with status 400 (bad input) or 500 (data store).
async fn match_teachers(
    state: web::Data<AppState>,
    req: web::Json<MatchTeachersRequest>,
) -> impl Responder {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("match_teachers", %request_id);

    let result = state
        .matcher
        .match_teachers(&req.skill)
        .instrument(span)
        .await;

    match result {
        Ok(response) => HttpResponse::Ok()
            .insert_header((header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
            .json(response),
        Err(e) => {
            tracing::info!("Match request {} failed: {}", request_id, e);
            HttpResponse::build(e.status_code())
                .insert_header((header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
                .json(e.to_response())
        }
    }
}
