pub mod auth_handlers;
pub mod profile_handlers;
pub mod public_handlers;

use actix_web::error::InternalError;
use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::errors::ApiError;
use crate::state::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(auth_handlers::register)
        .service(auth_handlers::login)
        .service(auth_handlers::logout)
        .service(auth_handlers::session)
        .service(auth_handlers::complete_profile)
        .service(auth_handlers::verify_email)
        .service(auth_handlers::resend_verification)
        .service(profile_handlers::get_brand_profile)
        .service(profile_handlers::update_brand_profile)
        .service(profile_handlers::get_profile)
        .service(profile_handlers::update_profile)
        // check-username must register before the dynamic /public/{username}
        // segment or the literal path would be captured as a username.
        .service(public_handlers::check_username)
        .service(public_handlers::public_profile);
}

/// Malformed or oversized JSON bodies answer with the same flat error shape
/// the handlers use, instead of actix's plain-text default.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let body = json!({ "error": err.to_string() });
        InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    })
}

/// Rate-limit key for the caller. The raw `x-forwarded-for` value is good
/// enough here; callers without one share a single bucket.
pub(crate) fn client_ip(req: &HttpRequest) -> String {
    req.headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
        .unwrap_or_else(|| "anonymous".to_string())
}

pub(crate) fn ensure_rate_limit(state: &AppState, req: &HttpRequest) -> Result<(), ApiError> {
    if state.rate_limits.check(&client_ip(req)) {
        Ok(())
    } else {
        Err(ApiError::RateLimited)
    }
}
