use async_trait::async_trait;
use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::user::{AuthUser, Session, SignInOutcome};

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("email already registered")]
    AlreadyRegistered,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("email not confirmed")]
    EmailNotConfirmed,
    #[error("supabase error: {0}")]
    Supabase(String),
}

/// Metadata mirrored onto the auth user after profile completion. Key names
/// match what the session endpoint reads back.
#[derive(Debug, Serialize)]
pub struct ProfileMetadata {
    pub username: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
    #[serde(rename = "birthDate")]
    pub birth_date: String,
    pub profile_completed: bool,
}

/// Account operations delegated to the hosted auth provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Creates the account and returns its id. The provider sends its own
    /// confirmation link pointing at `email_redirect_to`.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        account_type: &str,
        email_redirect_to: &str,
    ) -> Result<Uuid, IdentityError>;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SignInOutcome, IdentityError>;

    /// Resolves an access token to its account. `None` means the token is
    /// missing from the provider's view: expired, revoked, or forged.
    async fn get_user(&self, access_token: &str) -> Result<Option<AuthUser>, IdentityError>;

    /// Admin lookup by email address. `None` when no account matches.
    async fn get_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, IdentityError>;

    async fn update_user_metadata(
        &self,
        user_id: Uuid,
        metadata: &ProfileMetadata,
    ) -> Result<(), IdentityError>;
}

/// GoTrue REST client. Uses the anon key for user-facing calls and the
/// service role key for admin ones.
#[derive(Clone)]
pub struct SupabaseIdentity {
    client: reqwest::Client,
    supabase_url: String,
    anon_key: String,
    service_role_key: String,
}

impl SupabaseIdentity {
    pub fn new(
        client: reqwest::Client,
        supabase_url: &str,
        anon_key: &str,
        service_role_key: &str,
    ) -> Self {
        Self {
            client,
            supabase_url: supabase_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.trim().to_string(),
            service_role_key: service_role_key.trim().to_string(),
        }
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.supabase_url, path)
    }
}

/// Pulls the human-readable message out of a GoTrue error body.
fn provider_message(text: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(text) {
        for key in ["msg", "message", "error_description"] {
            if let Some(message) = value.get(key).and_then(|v| v.as_str()) {
                return message.to_string();
            }
        }
    }
    text.to_string()
}

#[async_trait]
impl IdentityProvider for SupabaseIdentity {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        account_type: &str,
        email_redirect_to: &str,
    ) -> Result<Uuid, IdentityError> {
        #[derive(Serialize)]
        struct Body<'a> {
            email: &'a str,
            password: &'a str,
            data: serde_json::Value,
        }

        let body = Body {
            email: email.trim(),
            password,
            data: serde_json::json!({ "account_type": account_type }),
        };

        let resp = self
            .client
            .post(self.auth_url("/signup"))
            .header("apikey", &self.anon_key)
            .query(&[("redirect_to", email_redirect_to)])
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();

        if !status.is_success() {
            let message = provider_message(&text);
            if message.contains("already registered") {
                return Err(IdentityError::AlreadyRegistered);
            }
            return Err(IdentityError::Supabase(message));
        }

        let json_val: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| IdentityError::Supabase(format!("invalid signup response: {}", e)))?;

        // GoTrue nests the user when confirmation is off and inlines it
        // when confirmation is required.
        json_val
            .get("user")
            .and_then(|user| user.get("id"))
            .or_else(|| json_val.get("id"))
            .and_then(|v| v.as_str())
            .and_then(|s| Uuid::parse_str(s).ok())
            .ok_or_else(|| IdentityError::Supabase("signup returned no user id".to_string()))
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SignInOutcome, IdentityError> {
        #[derive(Serialize)]
        struct Body<'a> {
            email: &'a str,
            password: &'a str,
        }

        #[derive(Deserialize)]
        struct TokenResp {
            access_token: String,
            refresh_token: Option<String>,
            expires_in: Option<i64>,
            token_type: Option<String>,
            user: AuthUser,
        }

        let resp = self
            .client
            .post(self.auth_url("/token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&Body { email, password })
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();

        if !status.is_success() {
            let message = provider_message(&text);
            if message.contains("Invalid login credentials") {
                return Err(IdentityError::InvalidCredentials);
            }
            if message.contains("Email not confirmed") {
                return Err(IdentityError::EmailNotConfirmed);
            }
            return Err(IdentityError::Supabase(message));
        }

        let token: TokenResp = serde_json::from_str(&text)
            .map_err(|e| IdentityError::Supabase(format!("invalid login response: {}", e)))?;

        Ok(SignInOutcome {
            session: Session {
                access_token: token.access_token,
                refresh_token: token.refresh_token,
                expires_in: token.expires_in,
                token_type: token.token_type,
            },
            user: token.user,
        })
    }

    async fn get_user(&self, access_token: &str) -> Result<Option<AuthUser>, IdentityError> {
        let resp = self
            .client
            .get(self.auth_url("/user"))
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Ok(None);
        }

        let user = resp.json::<AuthUser>().await?;
        Ok(Some(user))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, IdentityError> {
        #[derive(Deserialize)]
        struct AdminUsers {
            users: Vec<AuthUser>,
        }

        let resp = self
            .client
            .get(self.auth_url("/admin/users"))
            .query(&[("email", email)])
            .header("apikey", &self.service_role_key)
            .header("Authorization", format!("Bearer {}", &self.service_role_key))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!("admin user lookup failed: {} {}", status, text);
            return Ok(None);
        }

        let listing = resp.json::<AdminUsers>().await?;
        Ok(listing.users.into_iter().next())
    }

    async fn update_user_metadata(
        &self,
        user_id: Uuid,
        metadata: &ProfileMetadata,
    ) -> Result<(), IdentityError> {
        let body = serde_json::json!({ "user_metadata": metadata });

        let resp = self
            .client
            .put(self.auth_url(&format!("/admin/users/{}", user_id)))
            .header("apikey", &self.service_role_key)
            .header("Authorization", format!("Bearer {}", &self.service_role_key))
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(IdentityError::Supabase(format!(
                "metadata update failed: {} {}",
                status, text
            )));
        }

        Ok(())
    }
}
