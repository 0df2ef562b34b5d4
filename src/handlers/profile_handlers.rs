use actix_web::{get, put, web, HttpResponse};

use crate::dtos::auth_dtos::MessageOut;
use crate::dtos::profile_dtos::{ProfileOut, UpdateBrandProfileIn, UpdateProfileIn};
use crate::errors::{dependency, ApiError};
use crate::middleware::auth_extractor::{require_user, AuthToken};
use crate::models::profile::ProfileChanges;
use crate::state::AppState;
use crate::validation::{validate_brand_profile, validate_profile_update};

const LOGIN_REQUIRED: &str = "You must be logged in.";

#[get("/profile")]
pub async fn get_profile(
    state: web::Data<AppState>,
    token: AuthToken,
) -> Result<HttpResponse, ApiError> {
    let user = require_user(&state, &token, LOGIN_REQUIRED).await?;

    let profile = state
        .store
        .fetch_profile(user.id)
        .await
        .map_err(|e| dependency("Failed to load profile.", e))?
        .ok_or_else(|| {
            ApiError::NotFound("Profile not found. Please complete your profile first.".to_string())
        })?;

    Ok(HttpResponse::Ok().json(ProfileOut {
        success: true,
        profile,
    }))
}

#[put("/profile")]
pub async fn update_profile(
    state: web::Data<AppState>,
    token: AuthToken,
    body: web::Json<UpdateProfileIn>,
) -> Result<HttpResponse, ApiError> {
    let user = require_user(&state, &token, LOGIN_REQUIRED).await?;
    validate_profile_update(&body)?;
    let body = body.into_inner();

    // Absent fields stay untouched; the username cannot change here.
    let changes = ProfileChanges {
        display_name: Some(body.display_name),
        bio: body.bio,
        avatar_url: body.avatar_url,
        location: body.location,
        website: body.website,
        ..Default::default()
    };
    state
        .store
        .update_profile(user.id, &changes)
        .await
        .map_err(|e| dependency("Failed to update profile.", e))?;

    Ok(HttpResponse::Ok().json(MessageOut {
        success: true,
        message: "Profile updated successfully.".to_string(),
    }))
}

/// Same shape as GET /profile; the brand dashboard reads it separately.
#[get("/profile/brand")]
pub async fn get_brand_profile(
    state: web::Data<AppState>,
    token: AuthToken,
) -> Result<HttpResponse, ApiError> {
    let user = require_user(&state, &token, LOGIN_REQUIRED).await?;

    let profile = state
        .store
        .fetch_profile(user.id)
        .await
        .map_err(|e| dependency("Failed to load profile.", e))?
        .ok_or_else(|| {
            ApiError::NotFound("Profile not found. Please complete your profile first.".to_string())
        })?;

    Ok(HttpResponse::Ok().json(ProfileOut {
        success: true,
        profile,
    }))
}

#[put("/profile/brand")]
pub async fn update_brand_profile(
    state: web::Data<AppState>,
    token: AuthToken,
    body: web::Json<UpdateBrandProfileIn>,
) -> Result<HttpResponse, ApiError> {
    let user = require_user(&state, &token, LOGIN_REQUIRED).await?;
    validate_brand_profile(&body)?;
    let body = body.into_inner();

    let changes = ProfileChanges {
        display_name: Some(body.display_name),
        bio: body.bio,
        business_category: Some(body.business_category),
        established_date: Some(body.established_date),
        logo: body.logo,
        location: body.location,
        website: body.website,
        employee_count: body.employee_count,
        hide_established: body.hide_established,
        ..Default::default()
    };
    state
        .store
        .update_profile(user.id, &changes)
        .await
        .map_err(|e| dependency("Failed to update profile.", e))?;

    Ok(HttpResponse::Ok().json(MessageOut {
        success: true,
        message: "Profile updated successfully.".to_string(),
    }))
}
