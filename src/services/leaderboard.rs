// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Leaderboard builder.
//!
//! Two phases:
//! 1. Aggregate each user's activities (grouped by `user_email` through a
//!    hash index, so the whole pass is O(users + activities)).
//! 2. Stable sort by total calories descending, then assign ranks 1..N by
//!    position. Ties keep the order in which users were given.

use crate::db::{collections, Database};
use crate::error::Result;
use crate::models::{Activity, LeaderboardEntry, TeamStanding, User};
use crate::models::leaderboard::round_distance;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Build a ranked leaderboard with one entry per user.
///
/// Activities whose email matches no user are ignored. Field values are
/// not validated.
pub fn build_leaderboard(
    users: &[User],
    activities: &[Activity],
    now: DateTime<Utc>,
) -> Vec<LeaderboardEntry> {
    let mut by_email: HashMap<&str, Vec<&Activity>> = HashMap::with_capacity(users.len());
    for activity in activities {
        by_email
            .entry(activity.user_email.as_str())
            .or_default()
            .push(activity);
    }

    let mut entries: Vec<LeaderboardEntry> = users
        .iter()
        .map(|user| {
            let group = by_email
                .get(user.email.as_str())
                .map(Vec::as_slice)
                .unwrap_or_default();
            LeaderboardEntry::from_activities(user, group.iter().copied(), now)
        })
        .collect();

    // sort_by is stable
    entries.sort_by(|a, b| b.total_calories.cmp(&a.total_calories));
    for (position, entry) in entries.iter_mut().enumerate() {
        entry.rank = position as u32 + 1;
    }

    entries
}

/// Roll a leaderboard up into per-team totals, ranked like users.
pub fn team_standings(entries: &[LeaderboardEntry]) -> Vec<TeamStanding> {
    let mut order: Vec<&str> = Vec::new();
    let mut totals: HashMap<&str, TeamStanding> = HashMap::new();

    for entry in entries {
        let standing = totals.entry(entry.team.as_str()).or_insert_with(|| {
            order.push(entry.team.as_str());
            TeamStanding {
                team: entry.team.clone(),
                members: 0,
                total_activities: 0,
                total_calories: 0,
                total_distance_km: 0.0,
                rank: 0,
            }
        });
        standing.members += 1;
        standing.total_activities += entry.total_activities;
        standing.total_calories += entry.total_calories;
        standing.total_distance_km += entry.total_distance_km;
    }

    let mut standings: Vec<TeamStanding> = order
        .into_iter()
        .filter_map(|team| totals.remove(team))
        .map(|mut s| {
            s.total_distance_km = round_distance(s.total_distance_km);
            s
        })
        .collect();

    standings.sort_by(|a, b| b.total_calories.cmp(&a.total_calories));
    for (position, standing) in standings.iter_mut().enumerate() {
        standing.rank = position as u32 + 1;
    }

    standings
}

/// Rebuild the leaderboard from stored users and activities and publish it.
///
/// Returns the published entries (with storage IDs).
pub async fn recompute(db: &Database) -> Result<Vec<LeaderboardEntry>> {
    let users: Vec<User> = db.list(collections::USERS).await?;
    let activities: Vec<Activity> = db.list(collections::ACTIVITIES).await?;

    let entries = publish(db, &users, &activities, Utc::now()).await?;

    tracing::info!(
        users = users.len(),
        activities = activities.len(),
        "Leaderboard recomputed"
    );

    Ok(entries)
}

/// Build the leaderboard and replace the stored snapshot atomically.
pub async fn publish(
    db: &Database,
    users: &[User],
    activities: &[Activity],
    now: DateTime<Utc>,
) -> Result<Vec<LeaderboardEntry>> {
    let mut entries = build_leaderboard(users, activities, now);
    let ids = db.replace_all(collections::LEADERBOARD, &entries).await?;

    for (entry, id) in entries.iter_mut().zip(ids) {
        entry.id = Some(id);
    }

    if let Some(leader) = entries.first() {
        tracing::debug!(
            leader = %leader.user_name,
            calories = leader.total_calories,
            "Leaderboard published"
        );
    }

    Ok(entries)
}
