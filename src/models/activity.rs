// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Activity model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Activity types used when generating fixture data.
pub const ACTIVITY_TYPES: [&str; 7] = [
    "Running",
    "Cycling",
    "Swimming",
    "Weightlifting",
    "Yoga",
    "Boxing",
    "CrossFit",
];

/// One exercise session, stored in the `activities` collection.
///
/// `user_name` and `team` are copied from the owning user when the
/// activity is created; renames are not propagated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "frontend/src/generated/")
)]
pub struct Activity {
    #[serde(
        default,
        alias = "_firestore_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    /// Owner email (join key into `users`)
    pub user_email: String,
    pub user_name: String,
    pub team: String,
    /// Activity type (Running, Cycling, ...)
    pub activity_type: String,
    pub duration_minutes: i64,
    pub calories_burned: i64,
    pub distance_km: f64,
    /// When the session took place
    pub date: DateTime<Utc>,
    pub notes: String,
}

/// Request body for recording an activity.
///
/// The denormalized name and team are looked up from the stored user.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewActivity {
    #[validate(email)]
    pub user_email: String,
    #[validate(length(min = 1, max = 100))]
    pub activity_type: String,
    #[validate(range(min = 1, max = 1440))]
    pub duration_minutes: i64,
    #[validate(range(min = 1))]
    pub calories_burned: i64,
    #[validate(range(min = 0.0))]
    pub distance_km: f64,
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: String,
}
