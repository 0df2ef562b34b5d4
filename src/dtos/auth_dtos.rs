use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::profile::CompletedProfile;

/// POST /auth/register body.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterIn {
    pub role: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Deserialize)]
pub struct LoginIn {
    pub email: String,
    pub password: String,
}

/// POST /auth/complete-profile body.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteProfileIn {
    pub username: String,
    pub full_name: String,
    pub birth_date: String,
}

/// Body shared by verify-email and resend-verification.
#[derive(Deserialize)]
pub struct EmailIn {
    pub email: String,
}

#[derive(Serialize)]
pub struct MessageOut {
    pub success: bool,
    pub message: String,
}

/// POST /auth/login response. Tokens travel in the session cookie, never in
/// the body.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOut {
    pub success: bool,
    pub message: String,
    pub email_verified: bool,
    pub profile_complete: bool,
}

#[derive(Serialize)]
pub struct VerificationOut {
    pub success: bool,
    pub verified: bool,
    pub message: String,
}

#[derive(Serialize)]
pub struct SessionOut {
    pub user: Option<SessionUser>,
}

/// The non-sensitive slice of the account the frontend may see.
#[derive(Serialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: Option<String>,
    pub role: Option<String>,
    pub username: Option<String>,
    pub profile_completed: bool,
}

#[derive(Serialize)]
pub struct CompleteProfileOut {
    pub success: bool,
    pub message: String,
    pub profile: CompletedProfile,
}
