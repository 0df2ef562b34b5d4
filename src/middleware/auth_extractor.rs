use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use futures::future::{ready, Ready};

use crate::errors::{dependency, ApiError};
use crate::models::user::AuthUser;
use crate::state::AppState;

/// Cookie the login handler sets and the browser sends back on every call.
pub const SESSION_COOKIE: &str = "sb-access-token";

/// The caller's access token, if any. An `Authorization: Bearer` header wins
/// over the session cookie so API clients can bypass cookie handling.
#[derive(Debug, Clone)]
pub struct AuthToken(pub Option<String>);

impl AuthToken {
    pub fn from_http_request(req: &HttpRequest) -> Self {
        let bearer = req
            .headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty());

        let token = bearer.or_else(|| req.cookie(SESSION_COOKIE).map(|c| c.value().to_string()));
        AuthToken(token)
    }
}

impl FromRequest for AuthToken {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(AuthToken::from_http_request(req)))
    }
}

/// Resolves the token to an account via the identity provider. `message` is
/// the 401 body when the caller is anonymous or the token is stale.
pub async fn require_user(
    state: &AppState,
    token: &AuthToken,
    message: &str,
) -> Result<AuthUser, ApiError> {
    let token = token
        .0
        .as_deref()
        .ok_or_else(|| ApiError::Unauthenticated(message.to_string()))?;

    match state.identity.get_user(token).await {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err(ApiError::Unauthenticated(message.to_string())),
        Err(e) => Err(dependency("Session lookup failed.", e)),
    }
}
