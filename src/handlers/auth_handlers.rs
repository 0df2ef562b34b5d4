use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use chrono::Utc;
use log::{debug, warn};

use crate::dtos::auth_dtos::{
    CompleteProfileIn, CompleteProfileOut, EmailIn, LoginIn, LoginOut, MessageOut, RegisterIn,
    SessionOut, SessionUser, VerificationOut,
};
use crate::errors::{dependency, ApiError};
use crate::handlers::ensure_rate_limit;
use crate::middleware::auth_extractor::{require_user, AuthToken, SESSION_COOKIE};
use crate::models::profile::NewProfile;
use crate::services::identity::ProfileMetadata;
use crate::services::mailer::{verification_email, verification_reminder_email};
use crate::services::store::StoreError;
use crate::state::AppState;
use crate::validation::rules::{
    compute_age, default_avatar_url, normalize_birth_date, MINIMUM_AGE_YEARS,
};
use crate::validation::{
    validate_complete_profile, validate_email_payload, validate_login, validate_register,
};

const MAIL_NOT_CONFIGURED: &str =
    "Email configuration is incomplete. Set RESEND_API_KEY and RESEND_FROM_EMAIL.";

#[post("/auth/register")]
pub async fn register(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<RegisterIn>,
) -> Result<HttpResponse, ApiError> {
    ensure_rate_limit(&state, &req)?;
    validate_register(&body)?;

    let redirect_to = format!("{}/complete-profile", state.app_url.trim_end_matches('/'));
    let user_id = state
        .identity
        .sign_up(&body.email, &body.password, &body.role, &redirect_to)
        .await?;
    debug!("registered account {}", user_id);

    // The account exists at this point even if mail fails below; the user
    // can still recover through the resend endpoint.
    let mailer = state.mailer.as_ref().ok_or_else(|| ApiError::Dependency {
        message: MAIL_NOT_CONFIGURED.to_string(),
        detail: None,
    })?;
    mailer.send(verification_email(body.email.trim())).await?;

    Ok(HttpResponse::Ok().json(MessageOut {
        success: true,
        message: "Registration successful. Please check your email to verify your account."
            .to_string(),
    }))
}

#[post("/auth/login")]
pub async fn login(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<LoginIn>,
) -> Result<HttpResponse, ApiError> {
    ensure_rate_limit(&state, &req)?;
    validate_login(&body)?;

    let outcome = state
        .identity
        .sign_in_with_password(&body.email, &body.password)
        .await?;

    let email_verified = outcome.user.email_confirmed_at.is_some();
    let profile_complete = match state.store.user_has_username(outcome.user.id).await {
        Ok(has_username) => has_username,
        Err(e) => {
            warn!("profile-complete probe failed for {}: {}", outcome.user.id, e);
            false
        }
    };

    let mut cookie = Cookie::build(SESSION_COOKIE, outcome.session.access_token.clone())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish();
    if let Some(expires_in) = outcome.session.expires_in {
        cookie.set_max_age(CookieDuration::seconds(expires_in));
    }

    Ok(HttpResponse::Ok().cookie(cookie).json(LoginOut {
        success: true,
        message: "Login successful.".to_string(),
        email_verified,
        profile_complete,
    }))
}

#[post("/auth/logout")]
pub async fn logout() -> HttpResponse {
    let mut cookie = Cookie::build(SESSION_COOKIE, "")
        .path("/")
        .http_only(true)
        .finish();
    cookie.make_removal();

    HttpResponse::Ok().cookie(cookie).json(MessageOut {
        success: true,
        message: "Logged out successfully.".to_string(),
    })
}

/// Reports who the session cookie belongs to. Always 200; an absent or
/// stale cookie just means `user: null`. The Authorization header is not
/// consulted here, only the cookie counts as a browser session.
#[get("/auth/session")]
pub async fn session(state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    let token = match req.cookie(SESSION_COOKIE) {
        Some(cookie) => cookie.value().to_string(),
        None => return HttpResponse::Ok().json(SessionOut { user: None }),
    };

    let user = match state.identity.get_user(&token).await {
        Ok(Some(user)) => {
            let metadata = user.user_metadata;
            Some(SessionUser {
                id: user.id,
                email: user.email,
                role: metadata.account_type,
                username: metadata.username,
                profile_completed: metadata.profile_completed,
            })
        }
        Ok(None) => None,
        Err(e) => {
            warn!("session lookup failed: {}", e);
            None
        }
    };

    HttpResponse::Ok().json(SessionOut { user })
}

#[post("/auth/complete-profile")]
pub async fn complete_profile(
    state: web::Data<AppState>,
    req: HttpRequest,
    token: AuthToken,
    body: web::Json<CompleteProfileIn>,
) -> Result<HttpResponse, ApiError> {
    ensure_rate_limit(&state, &req)?;
    let user = require_user(
        &state,
        &token,
        "You must be logged in to complete your profile.",
    )
    .await?;
    validate_complete_profile(&body)?;

    let birth_date = normalize_birth_date(&body.birth_date)
        .map_err(|_| ApiError::BadRequest("Invalid birth date format.".to_string()))?;
    let age = compute_age(birth_date, Utc::now().date_naive());
    if age < MINIMUM_AGE_YEARS {
        return Err(ApiError::BadRequest(format!(
            "You must be at least {} years old.",
            MINIMUM_AGE_YEARS
        )));
    }

    if let Some(owner) = state
        .store
        .find_conflicting_owner(&body.username, Some(user.id))
        .await?
    {
        debug!("username {} already owned by {}", body.username, owner);
        return Err(ApiError::Conflict("Username is already taken.".to_string()));
    }

    match state.store.update_username(user.id, &body.username).await {
        Ok(()) => {}
        Err(StoreError::Conflict(_)) => {
            return Err(ApiError::Conflict("Username is already taken.".to_string()));
        }
        Err(e) => return Err(dependency("Failed to save username.", e)),
    }

    let profile = NewProfile {
        user_id: user.id,
        username: body.username.clone(),
        display_name: body.full_name.clone(),
        birth_date,
        avatar_url: default_avatar_url(&body.username),
    };
    match state.store.upsert_profile(&profile).await {
        Ok(()) => {}
        Err(StoreError::Conflict(_)) => {
            return Err(ApiError::Conflict("Username is already taken.".to_string()));
        }
        Err(e) => return Err(dependency("Failed to save profile.", e)),
    }

    // Mirror into auth metadata so the session endpoint can answer without a
    // table read. Best effort: the rows above are already committed.
    let metadata = ProfileMetadata {
        username: body.username.clone(),
        full_name: body.full_name.clone(),
        birth_date: birth_date.to_string(),
        profile_completed: true,
    };
    if let Err(e) = state.identity.update_user_metadata(user.id, &metadata).await {
        warn!("metadata mirror failed for {}: {}", user.id, e);
    }

    let saved = state
        .store
        .fetch_completed_profile(user.id)
        .await
        .map_err(|e| dependency("Failed to load saved profile.", e))?
        .ok_or_else(|| ApiError::Dependency {
            message: "Failed to load saved profile.".to_string(),
            detail: None,
        })?;

    Ok(HttpResponse::Ok().json(CompleteProfileOut {
        success: true,
        message: "Profile completed successfully.".to_string(),
        profile: saved,
    }))
}

#[post("/auth/verify-email")]
pub async fn verify_email(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<EmailIn>,
) -> Result<HttpResponse, ApiError> {
    ensure_rate_limit(&state, &req)?;
    validate_email_payload(&body.email)?;

    let user = state
        .identity
        .get_user_by_email(body.email.trim())
        .await
        .map_err(|e| dependency("Identity provider request failed.", e))?
        .ok_or_else(|| ApiError::NotFound("Email not found.".to_string()))?;

    let verified = user.email_confirmed_at.is_some();
    let message = if verified {
        "Email is already verified."
    } else {
        "Email is not verified yet."
    };

    Ok(HttpResponse::Ok().json(VerificationOut {
        success: true,
        verified,
        message: message.to_string(),
    }))
}

#[post("/auth/resend-verification")]
pub async fn resend_verification(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<EmailIn>,
) -> Result<HttpResponse, ApiError> {
    ensure_rate_limit(&state, &req)?;
    validate_email_payload(&body.email)?;

    let user = state
        .identity
        .get_user_by_email(body.email.trim())
        .await
        .map_err(|e| dependency("Identity provider request failed.", e))?
        .ok_or_else(|| ApiError::NotFound("Email not found.".to_string()))?;

    if user.email_confirmed_at.is_some() {
        return Ok(HttpResponse::Ok().json(MessageOut {
            success: false,
            message: "Email is already verified.".to_string(),
        }));
    }

    let mailer = state.mailer.as_ref().ok_or_else(|| ApiError::Dependency {
        message: MAIL_NOT_CONFIGURED.to_string(),
        detail: None,
    })?;
    mailer
        .send(verification_reminder_email(body.email.trim()))
        .await?;

    Ok(HttpResponse::Ok().json(MessageOut {
        success: true,
        message: "Verification email has been resent.".to_string(),
    }))
}
