use serde::{Deserialize, Serialize};

use crate::models::profile::{Profile, PublicProfile};

/// PUT /profile body (creator form). Field names match the table columns.
#[derive(Deserialize)]
pub struct UpdateProfileIn {
    pub display_name: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
}

/// PUT /profile/brand body.
#[derive(Deserialize)]
pub struct UpdateBrandProfileIn {
    pub display_name: String,
    pub bio: Option<String>,
    pub business_category: String,
    pub established_date: String,
    pub logo: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub employee_count: Option<String>,
    pub hide_established: Option<bool>,
}

#[derive(Serialize)]
pub struct ProfileOut {
    pub success: bool,
    pub profile: Profile,
}

#[derive(Serialize)]
pub struct PublicProfileOut {
    pub success: bool,
    pub profile: PublicProfile,
}

/// GET /public/check-username response. Always carries `available` so the
/// signup form can bind to one field.
#[derive(Serialize)]
pub struct AvailabilityOut {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
