// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Leaderboard aggregates.
//!
//! Entries are a derived projection over users and activities. They are
//! rebuilt from scratch by the leaderboard builder and never edited in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::{Activity, User};

/// Per-user totals plus a position-based rank.
///
/// Stored in the `leaderboard` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "frontend/src/generated/")
)]
pub struct LeaderboardEntry {
    #[serde(
        default,
        alias = "_firestore_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    pub user_email: String,
    pub user_name: String,
    pub team: String,
    pub total_activities: u32,
    pub total_calories: i64,
    /// Rounded to 2 decimal places
    pub total_distance_km: f64,
    pub total_duration_minutes: i64,
    /// 1 = most calories burned
    pub rank: u32,
    pub last_updated: DateTime<Utc>,
}

impl LeaderboardEntry {
    /// Aggregate one user's activities into an unranked entry (`rank == 0`).
    pub fn from_activities<'a, I>(user: &User, activities: I, now: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = &'a Activity>,
    {
        let mut total_activities = 0;
        let mut total_calories = 0;
        let mut total_distance_km = 0.0;
        let mut total_duration_minutes = 0;

        for activity in activities {
            total_activities += 1;
            total_calories += activity.calories_burned;
            total_distance_km += activity.distance_km;
            total_duration_minutes += activity.duration_minutes;
        }

        Self {
            id: None,
            user_email: user.email.clone(),
            user_name: user.name.clone(),
            team: user.team.clone(),
            total_activities,
            total_calories,
            total_distance_km: round_distance(total_distance_km),
            total_duration_minutes,
            rank: 0,
            last_updated: now,
        }
    }
}

/// Round a distance to 2 decimals, halves away from zero.
pub fn round_distance(km: f64) -> f64 {
    (km * 100.0).round() / 100.0
}

/// Team totals derived from a built leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "frontend/src/generated/")
)]
pub struct TeamStanding {
    pub team: String,
    pub members: u32,
    pub total_activities: u32,
    pub total_calories: i64,
    pub total_distance_km: f64,
    pub rank: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_distance_half_away_from_zero() {
        assert_eq!(round_distance(1.005_000_1), 1.01);
        assert_eq!(round_distance(2.125), 2.13);
        assert_eq!(round_distance(-2.125), -2.13);
        assert_eq!(round_distance(10.0), 10.0);
        assert_eq!(round_distance(7.4449), 7.44);
    }

    #[test]
    fn test_from_activities_empty() {
        let user = User::new("Nobody", "nobody@example.com", "Team X", "Cardio");
        let now = Utc::now();

        let entry = LeaderboardEntry::from_activities(&user, std::iter::empty::<&Activity>(), now);

        assert_eq!(entry.total_activities, 0);
        assert_eq!(entry.total_calories, 0);
        assert_eq!(entry.total_distance_km, 0.0);
        assert_eq!(entry.total_duration_minutes, 0);
        assert_eq!(entry.rank, 0);
        assert_eq!(entry.last_updated, now);
        assert_eq!(entry.team, "Team X");
    }
}
