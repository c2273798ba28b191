// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Workout catalog model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Difficulty tiers a workout can be tagged with.
pub const DIFFICULTIES: [&str; 3] = ["Beginner", "Intermediate", "Advanced"];

/// Equipment tags a workout can require.
pub const EQUIPMENT: [&str; 5] = ["None", "Dumbbells", "Barbell", "Resistance Bands", "Yoga Mat"];

/// Catalog entry, independent of any user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "frontend/src/generated/")
)]
pub struct Workout {
    #[serde(
        default,
        alias = "_firestore_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    pub name: String,
    /// Category (Strength Training, Cardio, ...)
    pub category: String,
    pub description: String,
    pub duration_minutes: i64,
    pub difficulty: String,
    pub calories_per_hour: i64,
    pub equipment_needed: String,
    pub created_at: DateTime<Utc>,
}
