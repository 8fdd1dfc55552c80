// Route exports
pub mod teachers;

use actix_cors::Cors;
use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(teachers::configure),
    );
}

/// Permissive CORS for actual requests
///
/// Pre-flight handling is left to the explicit OPTIONS route so that every
/// OPTIONS request gets the same empty 200 answer.
pub fn cors() -> Cors {
    Cors::permissive().disable_preflight()
}
