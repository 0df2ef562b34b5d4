use std::fmt::Display;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use log::warn;
use serde_json::json;
use thiserror::Error;

use crate::services::identity::IdentityError;
use crate::services::mailer::MailError;
use crate::services::store::StoreError;
use crate::validation::FieldErrors;

/// Everything a handler can fail with, mapped onto the response taxonomy:
/// flat `{"error": ...}` bodies for single-message failures and a nested
/// `{"errors": {...}}` body for validation.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Too many attempts. Please try again in a minute.")]
    RateLimited,
    #[error("{0}")]
    Unauthenticated(String),
    #[error("validation failed")]
    Validation(FieldErrors),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{message}")]
    Dependency {
        message: String,
        detail: Option<String>,
    },
    #[error("{0}")]
    Unknown(String),
}

/// A downstream failure the client cannot fix. The underlying error is
/// logged here and echoed in the `detail` field.
pub fn dependency(message: &str, source: impl Display) -> ApiError {
    warn!("{} {}", message, source);
    ApiError::Dependency {
        message: message.to_string(),
        detail: Some(source.to_string()),
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Dependency { .. } | ApiError::Unknown(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::Validation(errors) => json!({ "errors": errors }),
            ApiError::Dependency {
                message,
                detail: Some(detail),
            } => json!({ "error": message, "detail": detail }),
            other => json!({ "error": other.to_string() }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::AlreadyRegistered => {
                ApiError::Conflict("Email is already registered.".to_string())
            }
            IdentityError::InvalidCredentials => {
                ApiError::Unauthenticated("Invalid email or password.".to_string())
            }
            IdentityError::EmailNotConfirmed => ApiError::Forbidden(
                "Your email has not been verified yet. Please check your inbox.".to_string(),
            ),
            IdentityError::Supabase(message) => ApiError::BadRequest(message),
            IdentityError::Http(e) => dependency("Identity provider request failed.", e),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(_) => ApiError::Conflict("Username is already taken.".to_string()),
            other => dependency("Data store request failed.", other),
        }
    }
}

impl From<MailError> for ApiError {
    fn from(err: MailError) -> Self {
        dependency("Failed to send verification email.", err)
    }
}
