use actix_web::{get, web, HttpResponse};
use log::warn;
use serde::Deserialize;

use crate::dtos::profile_dtos::{AvailabilityOut, PublicProfileOut};
use crate::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CheckUsernameQuery {
    pub username: Option<String>,
}

/// Availability probe for the signup form. Always answers with the
/// `{available, error?}` shape so the frontend has one code path.
#[get("/public/check-username")]
pub async fn check_username(
    state: web::Data<AppState>,
    query: web::Query<CheckUsernameQuery>,
) -> HttpResponse {
    let username = match query.username.as_deref().filter(|u| !u.is_empty()) {
        Some(username) => username,
        None => {
            return HttpResponse::BadRequest().json(AvailabilityOut {
                available: false,
                error: Some("Username is required.".to_string()),
            });
        }
    };

    match state.store.find_conflicting_owner(username, None).await {
        Ok(Some(_)) => HttpResponse::Ok().json(AvailabilityOut {
            available: false,
            error: None,
        }),
        Ok(None) => HttpResponse::Ok().json(AvailabilityOut {
            available: true,
            error: None,
        }),
        Err(e) => {
            warn!("username availability check failed: {}", e);
            HttpResponse::InternalServerError().json(AvailabilityOut {
                available: false,
                error: Some(format!("Failed to check username: {}", e)),
            })
        }
    }
}

/// The public link-in-bio page. Store failures read as missing profiles so
/// a backend blip never exposes an error page to visitors.
#[get("/public/{username}")]
pub async fn public_profile(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let username = path.into_inner();

    let profile = match state.store.fetch_public_profile(&username).await {
        Ok(profile) => profile,
        Err(e) => {
            warn!("public profile lookup failed for {}: {}", username, e);
            None
        }
    };

    let profile = profile.ok_or_else(|| ApiError::NotFound("Profile not found.".to_string()))?;

    Ok(HttpResponse::Ok().json(PublicProfileOut {
        success: true,
        profile,
    }))
}
