use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::models::profile::{CompletedProfile, NewProfile, Profile, ProfileChanges, PublicProfile};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("postgrest error: {0}")]
    Supabase(String),
    #[error("unique constraint violation: {0}")]
    Conflict(String),
}

/// Table reads and writes delegated to the hosted data store.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Looks for an owner of `username` in both the `users` and `profiles`
    /// tables, skipping rows owned by `exclude`. The username invariant
    /// spans both tables, so callers get one answer instead of two lookups.
    async fn find_conflicting_owner(
        &self,
        username: &str,
        exclude: Option<Uuid>,
    ) -> Result<Option<Uuid>, StoreError>;

    /// Writes the username onto the caller's user row. A store-level unique
    /// violation surfaces as [`StoreError::Conflict`].
    async fn update_username(&self, user_id: Uuid, username: &str) -> Result<(), StoreError>;

    /// Insert-or-overwrite keyed on `user_id`; resubmissions update the same
    /// row instead of inserting a second one.
    async fn upsert_profile(&self, profile: &NewProfile) -> Result<(), StoreError>;

    async fn fetch_completed_profile(
        &self,
        user_id: Uuid,
    ) -> Result<Option<CompletedProfile>, StoreError>;

    async fn fetch_profile(&self, user_id: Uuid) -> Result<Option<Profile>, StoreError>;

    async fn update_profile(
        &self,
        user_id: Uuid,
        changes: &ProfileChanges,
    ) -> Result<(), StoreError>;

    async fn fetch_public_profile(&self, username: &str)
        -> Result<Option<PublicProfile>, StoreError>;

    /// Whether the user row already carries a username. This is the
    /// profile-complete signal the login response reports.
    async fn user_has_username(&self, user_id: Uuid) -> Result<bool, StoreError>;
}

fn now_iso() -> String {
    Utc::now().to_rfc3339()
}

/// PostgREST client over the `users` and `profiles` tables. All access runs
/// with the service role key; row-level security is bypassed on purpose
/// because this service is the only caller.
#[derive(Clone)]
pub struct SupabaseStore {
    client: reqwest::Client,
    supabase_url: String,
    service_role_key: String,
}

impl SupabaseStore {
    pub fn new(client: reqwest::Client, supabase_url: &str, service_role_key: &str) -> Self {
        Self {
            client,
            supabase_url: supabase_url.trim_end_matches('/').to_string(),
            service_role_key: service_role_key.trim().to_string(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.supabase_url, table)
    }

    fn with_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.service_role_key)
            .header("Authorization", format!("Bearer {}", &self.service_role_key))
    }

    /// One `username = eq.{username}` lookup against a single table.
    async fn username_owner(
        &self,
        table: &str,
        owner_column: &str,
        username: &str,
    ) -> Result<Option<Uuid>, StoreError> {
        let filter = format!("eq.{}", username);
        let resp = self
            .with_auth(self.client.get(self.table_url(table)))
            .query(&[
                ("select", owner_column),
                ("username", filter.as_str()),
                ("limit", "1"),
            ])
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(StoreError::Supabase(format!(
                "{} lookup failed: {} {}",
                table, status, text
            )));
        }

        let rows: Value = serde_json::from_str(&text)
            .map_err(|e| StoreError::Supabase(format!("invalid json: {}", e)))?;

        Ok(rows
            .as_array()
            .and_then(|rows| rows.first())
            .and_then(|row| row.get(owner_column))
            .and_then(|v| v.as_str())
            .and_then(|s| Uuid::parse_str(s).ok()))
    }

    async fn fetch_rows<T: serde::de::DeserializeOwned>(
        &self,
        table: &str,
        select: &str,
        filter_column: &str,
        filter_value: &str,
    ) -> Result<Option<T>, StoreError> {
        let filter = format!("eq.{}", filter_value);
        let resp = self
            .with_auth(self.client.get(self.table_url(table)))
            .query(&[
                ("select", select),
                (filter_column, filter.as_str()),
                ("limit", "1"),
            ])
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(StoreError::Supabase(format!(
                "{} fetch failed: {} {}",
                table, status, text
            )));
        }

        let rows: Vec<T> = serde_json::from_str(&text)
            .map_err(|e| StoreError::Supabase(format!("invalid json: {}", e)))?;
        Ok(rows.into_iter().next())
    }
}

#[async_trait]
impl ProfileStore for SupabaseStore {
    async fn find_conflicting_owner(
        &self,
        username: &str,
        exclude: Option<Uuid>,
    ) -> Result<Option<Uuid>, StoreError> {
        if let Some(owner) = self.username_owner("users", "id", username).await? {
            if exclude != Some(owner) {
                return Ok(Some(owner));
            }
        }
        if let Some(owner) = self.username_owner("profiles", "user_id", username).await? {
            if exclude != Some(owner) {
                return Ok(Some(owner));
            }
        }
        Ok(None)
    }

    async fn update_username(&self, user_id: Uuid, username: &str) -> Result<(), StoreError> {
        let body = serde_json::json!({
            "username": username,
            "updated_at": now_iso(),
        });
        let filter = format!("eq.{}", user_id);

        let resp = self
            .with_auth(self.client.patch(self.table_url("users")))
            .header("Prefer", "return=minimal")
            .query(&[("id", filter.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let text = resp.text().await.unwrap_or_default();
        if status == reqwest::StatusCode::CONFLICT {
            return Err(StoreError::Conflict(text));
        }
        Err(StoreError::Supabase(format!(
            "username update failed: {} {}",
            status, text
        )))
    }

    async fn upsert_profile(&self, profile: &NewProfile) -> Result<(), StoreError> {
        let mut body = serde_json::to_value(profile)
            .map_err(|e| StoreError::Supabase(format!("serialize profile: {}", e)))?;
        if let Some(map) = body.as_object_mut() {
            map.insert("updated_at".to_string(), Value::String(now_iso()));
        }

        let resp = self
            .with_auth(self.client.post(self.table_url("profiles")))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .query(&[("on_conflict", "user_id")])
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let text = resp.text().await.unwrap_or_default();
        if status == reqwest::StatusCode::CONFLICT {
            return Err(StoreError::Conflict(text));
        }
        Err(StoreError::Supabase(format!(
            "profile upsert failed: {} {}",
            status, text
        )))
    }

    async fn fetch_completed_profile(
        &self,
        user_id: Uuid,
    ) -> Result<Option<CompletedProfile>, StoreError> {
        self.fetch_rows(
            "profiles",
            "user_id,username,display_name,birth_date,updated_at,avatar_url",
            "user_id",
            &user_id.to_string(),
        )
        .await
    }

    async fn fetch_profile(&self, user_id: Uuid) -> Result<Option<Profile>, StoreError> {
        self.fetch_rows("profiles", "*", "user_id", &user_id.to_string())
            .await
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        changes: &ProfileChanges,
    ) -> Result<(), StoreError> {
        let mut body = serde_json::to_value(changes)
            .map_err(|e| StoreError::Supabase(format!("serialize changes: {}", e)))?;
        if let Some(map) = body.as_object_mut() {
            map.insert("updated_at".to_string(), Value::String(now_iso()));
        }
        let filter = format!("eq.{}", user_id);

        let resp = self
            .with_auth(self.client.patch(self.table_url("profiles")))
            .header("Prefer", "return=minimal")
            .query(&[("user_id", filter.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let text = resp.text().await.unwrap_or_default();
        if status == reqwest::StatusCode::CONFLICT {
            return Err(StoreError::Conflict(text));
        }
        Err(StoreError::Supabase(format!(
            "profile update failed: {} {}",
            status, text
        )))
    }

    async fn fetch_public_profile(
        &self,
        username: &str,
    ) -> Result<Option<PublicProfile>, StoreError> {
        self.fetch_rows(
            "profiles",
            "display_name,bio,avatar_url,location,website,niche,tagline,business_category,established_date,logo,employee_count",
            "username",
            username,
        )
        .await
    }

    async fn user_has_username(&self, user_id: Uuid) -> Result<bool, StoreError> {
        let filter = format!("eq.{}", user_id);
        let resp = self
            .with_auth(self.client.get(self.table_url("users")))
            .query(&[("select", "username"), ("id", filter.as_str()), ("limit", "1")])
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(StoreError::Supabase(format!(
                "users fetch failed: {} {}",
                status, text
            )));
        }

        let rows: Value = serde_json::from_str(&text)
            .map_err(|e| StoreError::Supabase(format!("invalid json: {}", e)))?;

        Ok(rows
            .as_array()
            .and_then(|rows| rows.first())
            .and_then(|row| row.get("username"))
            .and_then(|v| v.as_str())
            .is_some_and(|username| !username.is_empty()))
    }
}
