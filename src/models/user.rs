//! User model for storage and API.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// User profile stored in the `users` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "frontend/src/generated/")
)]
pub struct User {
    /// Storage identifier (filled on read, never written)
    #[serde(
        default,
        alias = "_firestore_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    /// Display name
    pub name: String,
    /// Email address (unique, natural key)
    pub email: String,
    /// Team label (free-form, e.g. "Team Marvel")
    pub team: String,
    /// Training role (e.g. "Cardio")
    pub role: String,
}

impl User {
    pub fn new(name: &str, email: &str, team: &str, role: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            email: email.to_string(),
            team: team.to_string(),
            role: role.to_string(),
        }
    }
}

/// Request body for creating a user.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewUser {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 200))]
    pub team: String,
    #[validate(length(max = 200))]
    #[serde(default)]
    pub role: String,
}

impl From<NewUser> for User {
    fn from(new: NewUser) -> Self {
        Self {
            id: None,
            name: new.name,
            email: new.email,
            team: new.team,
            role: new.role,
        }
    }
}
