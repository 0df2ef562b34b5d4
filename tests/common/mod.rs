#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use uuid::Uuid;

use linkhub_be::models::profile::{
    CompletedProfile, NewProfile, Profile, ProfileChanges, PublicProfile,
};
use linkhub_be::models::user::{AuthUser, Session, SignInOutcome, UserMetadata};
use linkhub_be::rate_limit::RateLimiter;
use linkhub_be::services::identity::{IdentityError, IdentityProvider, ProfileMetadata};
use linkhub_be::services::mailer::{MailError, Mailer, OutboundEmail};
use linkhub_be::services::store::{ProfileStore, StoreError};
use linkhub_be::AppState;

pub const TEST_TOKEN: &str = "test-access-token";
pub const TEST_PASSWORD: &str = "Passw0rd!";

pub fn test_user(id: Uuid, email: &str, confirmed: bool) -> AuthUser {
    AuthUser {
        id,
        email: Some(email.to_string()),
        email_confirmed_at: confirmed.then(|| "2024-01-01T00:00:00Z".to_string()),
        user_metadata: UserMetadata::default(),
    }
}

/// In-memory stand-in for the auth provider. One shared password keeps the
/// sign-in arm simple; accounts are keyed by email, sessions by token.
pub struct MockIdentity {
    pub sessions: Mutex<HashMap<String, AuthUser>>,
    pub accounts: Mutex<HashMap<String, AuthUser>>,
    pub password: String,
    pub metadata_updates: Mutex<Vec<(Uuid, bool)>>,
    pub fail_metadata_update: bool,
}

impl Default for MockIdentity {
    fn default() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            accounts: Mutex::new(HashMap::new()),
            password: TEST_PASSWORD.to_string(),
            metadata_updates: Mutex::new(Vec::new()),
            fail_metadata_update: false,
        }
    }
}

impl MockIdentity {
    pub fn with_session(self, token: &str, user: AuthUser) -> Self {
        self.sessions.lock().insert(token.to_string(), user);
        self
    }

    pub fn with_account(self, user: AuthUser) -> Self {
        let email = user.email.clone().unwrap_or_default();
        self.accounts.lock().insert(email, user);
        self
    }
}

#[async_trait]
impl IdentityProvider for MockIdentity {
    async fn sign_up(
        &self,
        email: &str,
        _password: &str,
        account_type: &str,
        _email_redirect_to: &str,
    ) -> Result<Uuid, IdentityError> {
        let mut accounts = self.accounts.lock();
        if accounts.contains_key(email) {
            return Err(IdentityError::AlreadyRegistered);
        }
        let id = Uuid::new_v4();
        let mut user = test_user(id, email, false);
        user.user_metadata.account_type = Some(account_type.to_string());
        accounts.insert(email.to_string(), user);
        Ok(id)
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SignInOutcome, IdentityError> {
        let user = self
            .accounts
            .lock()
            .get(email)
            .cloned()
            .ok_or(IdentityError::InvalidCredentials)?;
        if password != self.password {
            return Err(IdentityError::InvalidCredentials);
        }
        if user.email_confirmed_at.is_none() {
            return Err(IdentityError::EmailNotConfirmed);
        }
        self.sessions.lock().insert(TEST_TOKEN.to_string(), user.clone());
        Ok(SignInOutcome {
            session: Session {
                access_token: TEST_TOKEN.to_string(),
                refresh_token: Some("test-refresh-token".to_string()),
                expires_in: Some(3600),
                token_type: Some("bearer".to_string()),
            },
            user,
        })
    }

    async fn get_user(&self, access_token: &str) -> Result<Option<AuthUser>, IdentityError> {
        Ok(self.sessions.lock().get(access_token).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, IdentityError> {
        Ok(self.accounts.lock().get(email).cloned())
    }

    async fn update_user_metadata(
        &self,
        user_id: Uuid,
        metadata: &ProfileMetadata,
    ) -> Result<(), IdentityError> {
        if self.fail_metadata_update {
            return Err(IdentityError::Supabase("metadata update rejected".to_string()));
        }
        self.metadata_updates
            .lock()
            .push((user_id, metadata.profile_completed));
        Ok(())
    }
}

/// One row of the in-memory `profiles` table.
#[derive(Debug, Clone, Default)]
pub struct StoredProfile {
    pub username: String,
    pub display_name: String,
    pub birth_date: String,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub business_category: Option<String>,
    pub established_date: Option<String>,
    pub logo: Option<String>,
    pub employee_count: Option<String>,
    pub hide_established: Option<bool>,
    pub updated_at: Option<String>,
}

pub fn stored_profile(username: &str, display_name: &str) -> StoredProfile {
    StoredProfile {
        username: username.to_string(),
        display_name: display_name.to_string(),
        birth_date: "2000-03-15".to_string(),
        avatar_url: Some(format!(
            "https://api.dicebear.com/6.x/initials/svg?seed={}",
            username
        )),
        ..Default::default()
    }
}

/// In-memory stand-in for the data store: `usernames` plays the `users`
/// table column, `profiles` the `profiles` table.
#[derive(Default)]
pub struct MockStore {
    pub usernames: Mutex<HashMap<Uuid, String>>,
    pub profiles: Mutex<HashMap<Uuid, StoredProfile>>,
    pub fail_reads: bool,
}

impl MockStore {
    pub fn with_username(self, user_id: Uuid, username: &str) -> Self {
        self.usernames.lock().insert(user_id, username.to_string());
        self
    }

    pub fn with_profile(self, user_id: Uuid, profile: StoredProfile) -> Self {
        self.profiles.lock().insert(user_id, profile);
        self
    }
}

#[async_trait]
impl ProfileStore for MockStore {
    async fn find_conflicting_owner(
        &self,
        username: &str,
        exclude: Option<Uuid>,
    ) -> Result<Option<Uuid>, StoreError> {
        if self.fail_reads {
            return Err(StoreError::Supabase("users lookup failed: 503".to_string()));
        }
        for (id, existing) in self.usernames.lock().iter() {
            if existing == username && exclude != Some(*id) {
                return Ok(Some(*id));
            }
        }
        for (id, profile) in self.profiles.lock().iter() {
            if profile.username == username && exclude != Some(*id) {
                return Ok(Some(*id));
            }
        }
        Ok(None)
    }

    async fn update_username(&self, user_id: Uuid, username: &str) -> Result<(), StoreError> {
        self.usernames.lock().insert(user_id, username.to_string());
        Ok(())
    }

    async fn upsert_profile(&self, profile: &NewProfile) -> Result<(), StoreError> {
        let mut profiles = self.profiles.lock();
        let row = profiles.entry(profile.user_id).or_default();
        row.username = profile.username.clone();
        row.display_name = profile.display_name.clone();
        row.birth_date = profile.birth_date.to_string();
        row.avatar_url = Some(profile.avatar_url.clone());
        row.updated_at = Some("2024-06-01T00:00:00Z".to_string());
        Ok(())
    }

    async fn fetch_completed_profile(
        &self,
        user_id: Uuid,
    ) -> Result<Option<CompletedProfile>, StoreError> {
        if self.fail_reads {
            return Err(StoreError::Supabase("profiles fetch failed: 503".to_string()));
        }
        Ok(self.profiles.lock().get(&user_id).map(|p| CompletedProfile {
            user_id,
            username: p.username.clone(),
            display_name: p.display_name.clone(),
            birth_date: p.birth_date.clone(),
            updated_at: p.updated_at.clone(),
            avatar_url: p.avatar_url.clone(),
        }))
    }

    async fn fetch_profile(&self, user_id: Uuid) -> Result<Option<Profile>, StoreError> {
        if self.fail_reads {
            return Err(StoreError::Supabase("profiles fetch failed: 503".to_string()));
        }
        Ok(self.profiles.lock().get(&user_id).map(|p| Profile {
            user_id,
            username: Some(p.username.clone()),
            display_name: Some(p.display_name.clone()),
            bio: p.bio.clone(),
            avatar_url: p.avatar_url.clone(),
            location: p.location.clone(),
            website: p.website.clone(),
            niche: None,
            tagline: None,
            business_category: p.business_category.clone(),
            established_date: p.established_date.clone(),
            logo: p.logo.clone(),
            employee_count: p.employee_count.clone(),
            hide_established: p.hide_established,
            birth_date: Some(p.birth_date.clone()),
            created_at: None,
            updated_at: p.updated_at.clone(),
        }))
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        changes: &ProfileChanges,
    ) -> Result<(), StoreError> {
        let mut profiles = self.profiles.lock();
        // PATCH matching zero rows succeeds.
        let Some(row) = profiles.get_mut(&user_id) else {
            return Ok(());
        };
        if let Some(v) = &changes.display_name {
            row.display_name = v.clone();
        }
        if let Some(v) = &changes.bio {
            row.bio = Some(v.clone());
        }
        if let Some(v) = &changes.avatar_url {
            row.avatar_url = Some(v.clone());
        }
        if let Some(v) = &changes.location {
            row.location = Some(v.clone());
        }
        if let Some(v) = &changes.website {
            row.website = Some(v.clone());
        }
        if let Some(v) = &changes.business_category {
            row.business_category = Some(v.clone());
        }
        if let Some(v) = &changes.established_date {
            row.established_date = Some(v.clone());
        }
        if let Some(v) = &changes.logo {
            row.logo = Some(v.clone());
        }
        if let Some(v) = &changes.employee_count {
            row.employee_count = Some(v.clone());
        }
        if let Some(v) = changes.hide_established {
            row.hide_established = Some(v);
        }
        row.updated_at = Some("2024-06-02T00:00:00Z".to_string());
        Ok(())
    }

    async fn fetch_public_profile(
        &self,
        username: &str,
    ) -> Result<Option<PublicProfile>, StoreError> {
        if self.fail_reads {
            return Err(StoreError::Supabase("profiles fetch failed: 503".to_string()));
        }
        Ok(self
            .profiles
            .lock()
            .values()
            .find(|p| p.username == username)
            .map(|p| PublicProfile {
                display_name: Some(p.display_name.clone()),
                bio: p.bio.clone(),
                avatar_url: p.avatar_url.clone(),
                location: p.location.clone(),
                website: p.website.clone(),
                niche: None,
                tagline: None,
                business_category: p.business_category.clone(),
                established_date: p.established_date.clone(),
                logo: p.logo.clone(),
                employee_count: p.employee_count.clone(),
            }))
    }

    async fn user_has_username(&self, user_id: Uuid) -> Result<bool, StoreError> {
        if self.fail_reads {
            return Err(StoreError::Supabase("users fetch failed: 503".to_string()));
        }
        Ok(self
            .usernames
            .lock()
            .get(&user_id)
            .is_some_and(|username| !username.is_empty()))
    }
}

#[derive(Default)]
pub struct MockMailer {
    pub sent: Mutex<Vec<OutboundEmail>>,
    pub fail: bool,
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError::Resend("550 mailbox unavailable".to_string()));
        }
        self.sent.lock().push(email);
        Ok(())
    }
}

pub struct TestHarness {
    pub identity: Arc<MockIdentity>,
    pub store: Arc<MockStore>,
    pub mailer: Arc<MockMailer>,
    pub state: AppState,
}

pub fn harness() -> TestHarness {
    harness_with(MockIdentity::default(), MockStore::default())
}

pub fn harness_with(identity: MockIdentity, store: MockStore) -> TestHarness {
    harness_full(identity, store, MockMailer::default())
}

pub fn harness_full(identity: MockIdentity, store: MockStore, mailer: MockMailer) -> TestHarness {
    let identity = Arc::new(identity);
    let store = Arc::new(store);
    let mailer = Arc::new(mailer);
    let mailer_dyn: Arc<dyn Mailer> = mailer.clone();
    let state = AppState {
        identity: identity.clone(),
        store: store.clone(),
        mailer: Some(mailer_dyn),
        rate_limits: Arc::new(RateLimiter::default()),
        app_url: "http://localhost:3000".to_string(),
    };
    TestHarness {
        identity,
        store,
        mailer,
        state,
    }
}
