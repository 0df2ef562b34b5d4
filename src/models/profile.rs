use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Full `profiles` row. Dates stay as the strings PostgREST sends; this API
/// passes them through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: Uuid,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub niche: Option<String>,
    pub tagline: Option<String>,
    pub business_category: Option<String>,
    pub established_date: Option<String>,
    pub logo: Option<String>,
    pub employee_count: Option<String>,
    pub hide_established: Option<bool>,
    pub birth_date: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Upsert payload written by profile completion. The store adds the
/// `updated_at` timestamp itself.
#[derive(Debug, Serialize)]
pub struct NewProfile {
    pub user_id: Uuid,
    pub username: String,
    pub display_name: String,
    pub birth_date: NaiveDate,
    pub avatar_url: String,
}

/// The slice of the profile returned right after completion.
#[derive(Debug, Serialize, Deserialize)]
pub struct CompletedProfile {
    pub user_id: Uuid,
    pub username: String,
    pub display_name: String,
    pub birth_date: String,
    pub updated_at: Option<String>,
    pub avatar_url: Option<String>,
}

/// Fields safe to show on a public page. No owner id, no birth date.
#[derive(Debug, Serialize, Deserialize)]
pub struct PublicProfile {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub niche: Option<String>,
    pub tagline: Option<String>,
    pub business_category: Option<String>,
    pub established_date: Option<String>,
    pub logo: Option<String>,
    pub employee_count: Option<String>,
}

/// PATCH payload for profile updates. `None` fields are left untouched in
/// the stored row.
#[derive(Debug, Default, Serialize)]
pub struct ProfileChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub established_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_count: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hide_established: Option<bool>,
}
