use serde::Deserialize;
use uuid::Uuid;

/// Account record as the auth provider returns it from `/auth/v1/user` and
/// the admin endpoints. Only the fields this service reads; the rest of the
/// payload is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
    pub email_confirmed_at: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

/// Free-form metadata blob attached to the auth user. Written on profile
/// completion, read back by the session endpoint. Every field is optional
/// because the provider stores whatever JSON it was last given.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserMetadata {
    pub account_type: Option<String>,
    pub username: Option<String>,
    #[serde(rename = "fullName")]
    pub full_name: Option<String>,
    #[serde(rename = "birthDate")]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub profile_completed: bool,
}

/// Token bundle from `/auth/v1/token?grant_type=password`.
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    pub token_type: Option<String>,
}

/// What a successful password sign-in yields.
#[derive(Debug, Clone)]
pub struct SignInOutcome {
    pub session: Session,
    pub user: AuthUser,
}
