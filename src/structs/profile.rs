use chrono::NaiveDate;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

use super::api::{CreateProfileBody, UpdateProfileBody};

pub const MAX_TEXT_LENGTH: usize = 256;
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;

/// One profile document per external subject. `userId` is unique and
/// immutable once written; `_id` is the store key, exposed to clients only
/// through its hex form.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user_id: String,
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
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl UserProfile {
    pub fn create(body: CreateProfileBody) -> Self {
        let now = DateTime::now();

        Self {
            id: ObjectId::new(),
            user_id: trimmed(body.user_id),
            name: trimmed_opt(body.name),
            surname: trimmed_opt(body.surname),
            gender: trimmed_opt(body.gender),
            date_of_birth: body.date_of_birth,
            profile_picture: trimmed_opt(body.profile_picture),
            active: body.active,
            continent_destination: trimmed_opt(body.continent_destination),
            country_destination: trimmed_opt(body.country_destination),
            travel_description: trimmed_opt(body.travel_description),
            age_preference: body.age_preference,
            gender_preference: trimmed_opt(body.gender_preference),
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrites exactly the fields supplied in the body. Presence decides,
    /// not truthiness: `active: false` is a supplied value, only an omitted
    /// field keeps its stored value. `userId` is not updatable.
    pub fn apply_update(&mut self, update: UpdateProfileBody) {
        if let Some(name) = update.name {
            self.name = Some(trimmed(name));
        }
        if let Some(surname) = update.surname {
            self.surname = Some(trimmed(surname));
        }
        if let Some(gender) = update.gender {
            self.gender = Some(trimmed(gender));
        }
        if let Some(date_of_birth) = update.date_of_birth {
            self.date_of_birth = Some(date_of_birth);
        }
        if let Some(profile_picture) = update.profile_picture {
            self.profile_picture = Some(trimmed(profile_picture));
        }
        if let Some(active) = update.active {
            self.active = Some(active);
        }
        if let Some(continent_destination) = update.continent_destination {
            self.continent_destination = Some(trimmed(continent_destination));
        }
        if let Some(country_destination) = update.country_destination {
            self.country_destination = Some(trimmed(country_destination));
        }
        if let Some(travel_description) = update.travel_description {
            self.travel_description = Some(trimmed(travel_description));
        }
        if let Some(age_preference) = update.age_preference {
            self.age_preference = Some(age_preference);
        }
        if let Some(gender_preference) = update.gender_preference {
            self.gender_preference = Some(trimmed(gender_preference));
        }

        self.updated_at = DateTime::now();
    }

    /// Field constraints checked before every persist, so a violation is a
    /// validation failure rather than a partial write.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.user_id.is_empty() {
            return Err(ValidationError::Required("userId"));
        }

        check_length("userId", Some(&self.user_id), MAX_TEXT_LENGTH)?;
        check_length("name", self.name.as_deref(), MAX_TEXT_LENGTH)?;
        check_length("surname", self.surname.as_deref(), MAX_TEXT_LENGTH)?;
        check_length("gender", self.gender.as_deref(), MAX_TEXT_LENGTH)?;
        check_length("profilePicture", self.profile_picture.as_deref(), MAX_TEXT_LENGTH)?;
        check_length(
            "continentDestination",
            self.continent_destination.as_deref(),
            MAX_TEXT_LENGTH,
        )?;
        check_length(
            "countryDestination",
            self.country_destination.as_deref(),
            MAX_TEXT_LENGTH,
        )?;
        check_length(
            "travelDescription",
            self.travel_description.as_deref(),
            MAX_DESCRIPTION_LENGTH,
        )?;
        check_length(
            "genderPreference",
            self.gender_preference.as_deref(),
            MAX_TEXT_LENGTH,
        )?;

        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationError {
    Required(&'static str),
    TooLong { field: &'static str, max: usize },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Required(field) => write!(f, "{} is required", field),
            ValidationError::TooLong { field, max } => {
                write!(f, "{} exceeds the maximum length of {} characters", field, max)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

fn check_length(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<(), ValidationError> {
    match value {
        Some(value) if value.chars().count() > max => {
            Err(ValidationError::TooLong { field, max })
        }
        _ => Ok(()),
    }
}

fn trimmed(value: String) -> String {
    value.trim().to_string()
}

fn trimmed_opt(value: Option<String>) -> Option<String> {
    value.map(trimmed)
}
