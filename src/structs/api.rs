use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::profile::UserProfile;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfileBody {
    pub user_id: String,
    pub name: Option<String>,
    pub surname: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub profile_picture: Option<String>,
    pub active: Option<bool>,
    pub continent_destination: Option<String>,
    pub country_destination: Option<String>,
    pub travel_description: Option<String>,
    pub age_preference: Option<Vec<u32>>,
    pub gender_preference: Option<String>,
}

/// Partial update body. Absent fields stay `None` and leave the stored
/// value untouched; there is deliberately no `userId` field.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileBody {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub profile_picture: Option<String>,
    pub active: Option<bool>,
    pub continent_destination: Option<String>,
    pub country_destination: Option<String>,
    pub travel_description: Option<String>,
    pub age_preference: Option<Vec<u32>>,
    pub gender_preference: Option<String>,
}

/// Serialized profile. Carries the hex `id` and no store-internal fields:
/// `_id` and `userId` never leave the service.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileBody {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continent_destination: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_destination: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub travel_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_preference: Option<Vec<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender_preference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserProfile> for ProfileBody {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id.to_hex(),
            name: profile.name,
            surname: profile.surname,
            gender: profile.gender,
            date_of_birth: profile.date_of_birth,
            profile_picture: profile.profile_picture,
            active: profile.active,
            continent_destination: profile.continent_destination,
            country_destination: profile.country_destination,
            travel_description: profile.travel_description,
            age_preference: profile.age_preference,
            gender_preference: profile.gender_preference,
            created_at: profile.created_at.to_chrono(),
            updated_at: profile.updated_at.to_chrono(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedBody {
    pub id: String,
}
