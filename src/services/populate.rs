// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Population run: seed fixture data and compute the first leaderboard.
//!
//! The run:
//! 1. Clears every collection except the leaderboard and registers the
//!    unique index on user email
//! 2. Inserts fixture users and teams
//! 3. Generates 5-15 random activities per user
//! 4. Builds the leaderboard and swaps it in for the previous snapshot
//! 5. Generates the workout catalog
//! 6. Reports the final count of each collection

use crate::db::{collections, Database};
use crate::error::Result;
use crate::models::activity::ACTIVITY_TYPES;
use crate::models::leaderboard::round_distance;
use crate::models::workout::{DIFFICULTIES, EQUIPMENT};
use crate::models::{Activity, Team, User, Workout};
use crate::services::leaderboard;
use crate::services::random::RandomSource;
use crate::time_utils::days_before;
use chrono::{DateTime, Utc};
use serde::Serialize;

const ACTIVITIES_PER_USER: (i64, i64) = (5, 15);
const ACTIVITY_DURATION_MINUTES: (i64, i64) = (20, 120);
const ACTIVITY_CALORIES: (i64, i64) = (100, 800);
const ACTIVITY_DISTANCE_KM: (f64, f64) = (1.0, 20.0);
const ACTIVITY_MAX_AGE_DAYS: i64 = 30;
const ACTIVITY_NOTE: &str = "Great workout session!";

const WORKOUT_DURATION_MINUTES: (i64, i64) = (30, 90);
const WORKOUT_CALORIES_PER_HOUR: (i64, i64) = (200, 600);

/// (name, email, team, role)
const FIXTURE_USERS: [(&str, &str, &str, &str); 12] = [
    ("Tony Stark", "iron.man@marvel.com", "Team Marvel", "Strength Training"),
    ("Steve Rogers", "captain.america@marvel.com", "Team Marvel", "Cardio"),
    ("Natasha Romanoff", "black.widow@marvel.com", "Team Marvel", "Flexibility"),
    ("Bruce Banner", "hulk@marvel.com", "Team Marvel", "Strength Training"),
    ("Thor Odinson", "thor@marvel.com", "Team Marvel", "Strength Training"),
    ("Peter Parker", "spider.man@marvel.com", "Team Marvel", "Cardio"),
    ("Bruce Wayne", "batman@dc.com", "Team DC", "Strength Training"),
    ("Clark Kent", "superman@dc.com", "Team DC", "Strength Training"),
    ("Diana Prince", "wonder.woman@dc.com", "Team DC", "Strength Training"),
    ("Barry Allen", "flash@dc.com", "Team DC", "Cardio"),
    ("Arthur Curry", "aquaman@dc.com", "Team DC", "Swimming"),
    ("Hal Jordan", "green.lantern@dc.com", "Team DC", "Cardio"),
];

/// (name, description)
const FIXTURE_TEAMS: [(&str, &str); 2] = [
    ("Team Marvel", "Earth's Mightiest Heroes"),
    ("Team DC", "Justice League"),
];

const WORKOUT_CATALOG: [(&str, &[&str]); 4] = [
    (
        "Strength Training",
        &["Bench Press", "Squats", "Deadlifts", "Pull-ups", "Dumbbell Rows"],
    ),
    (
        "Cardio",
        &["Interval Sprints", "Long Distance Run", "Cycling", "Jump Rope", "Burpees"],
    ),
    (
        "Flexibility",
        &["Yoga Flow", "Stretching Routine", "Pilates", "Foam Rolling"],
    ),
    (
        "Swimming",
        &["Freestyle Laps", "Butterfly Stroke", "Backstroke", "Water Aerobics"],
    ),
];

/// Final document counts after a population run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PopulationReport {
    pub users: usize,
    pub teams: usize,
    pub activities: usize,
    pub leaderboard: usize,
    pub workouts: usize,
}

/// The fixture users, in insertion order.
pub fn fixture_users() -> Vec<User> {
    FIXTURE_USERS
        .iter()
        .map(|(name, email, team, role)| User::new(name, email, team, role))
        .collect()
}

/// Teams whose members are the fixture users with a matching team label.
pub fn fixture_teams(users: &[User], now: DateTime<Utc>) -> Vec<Team> {
    FIXTURE_TEAMS
        .iter()
        .map(|(name, description)| Team {
            id: None,
            name: name.to_string(),
            description: description.to_string(),
            members: users
                .iter()
                .filter(|u| u.team == *name)
                .map(|u| u.email.clone())
                .collect(),
            created_at: now,
        })
        .collect()
}

/// Random activities for each user, grouped by user in input order.
pub fn generate_activities<R: RandomSource>(
    users: &[User],
    rng: &mut R,
    now: DateTime<Utc>,
) -> Result<Vec<Activity>> {
    let mut activities = Vec::new();

    for user in users {
        let count = rng.int_inclusive(ACTIVITIES_PER_USER.0, ACTIVITIES_PER_USER.1)?;
        for _ in 0..count {
            let activity_type = rng.choose(&ACTIVITY_TYPES)?.copied().unwrap_or("Running");
            let days_ago = rng.int_inclusive(0, ACTIVITY_MAX_AGE_DAYS)?;

            activities.push(Activity {
                id: None,
                user_email: user.email.clone(),
                user_name: user.name.clone(),
                team: user.team.clone(),
                activity_type: activity_type.to_string(),
                duration_minutes: rng
                    .int_inclusive(ACTIVITY_DURATION_MINUTES.0, ACTIVITY_DURATION_MINUTES.1)?,
                calories_burned: rng.int_inclusive(ACTIVITY_CALORIES.0, ACTIVITY_CALORIES.1)?,
                distance_km: round_distance(
                    rng.uniform(ACTIVITY_DISTANCE_KM.0, ACTIVITY_DISTANCE_KM.1)?,
                ),
                date: days_before(now, days_ago),
                notes: ACTIVITY_NOTE.to_string(),
            });
        }
    }

    Ok(activities)
}

/// The workout catalog with randomized duration, difficulty and equipment.
pub fn generate_workouts<R: RandomSource>(rng: &mut R, now: DateTime<Utc>) -> Result<Vec<Workout>> {
    let mut workouts = Vec::new();

    for (category, exercises) in WORKOUT_CATALOG {
        for exercise in exercises {
            workouts.push(Workout {
                id: None,
                name: exercise.to_string(),
                category: category.to_string(),
                description: format!("A challenging {} workout routine", exercise.to_lowercase()),
                duration_minutes: rng
                    .int_inclusive(WORKOUT_DURATION_MINUTES.0, WORKOUT_DURATION_MINUTES.1)?,
                difficulty: rng.choose(&DIFFICULTIES)?.copied().unwrap_or("Beginner").to_string(),
                calories_per_hour: rng
                    .int_inclusive(WORKOUT_CALORIES_PER_HOUR.0, WORKOUT_CALORIES_PER_HOUR.1)?,
                equipment_needed: rng.choose(&EQUIPMENT)?.copied().unwrap_or("None").to_string(),
                created_at: now,
            });
        }
    }

    Ok(workouts)
}

/// Run a full population against `db`.
///
/// Any storage error (including a duplicate user email) aborts the run.
pub async fn populate<R: RandomSource>(db: &Database, rng: &mut R) -> Result<PopulationReport> {
    let now = Utc::now();

    tracing::info!(backend = db.backend_name(), "Clearing existing data");
    // The leaderboard is only ever replaced, never emptied.
    for collection in collections::ALL
        .into_iter()
        .filter(|c| *c != collections::LEADERBOARD)
    {
        let removed = db.delete_all(collection).await?;
        tracing::debug!(collection, removed, "Collection cleared");
    }

    db.create_unique_index(collections::USERS, "email").await?;
    tracing::info!("Created unique index on email field");

    let users = fixture_users();
    let inserted = db.insert_many(collections::USERS, &users).await?;
    tracing::info!(count = inserted.len(), "Inserted users");

    let teams = fixture_teams(&users, now);
    let inserted = db.insert_many(collections::TEAMS, &teams).await?;
    tracing::info!(count = inserted.len(), "Inserted teams");

    let activities = generate_activities(&users, rng, now)?;
    let inserted = db.insert_many(collections::ACTIVITIES, &activities).await?;
    tracing::info!(count = inserted.len(), "Inserted activities");

    let entries = leaderboard::publish(db, &users, &activities, now).await?;
    tracing::info!(count = entries.len(), "Inserted leaderboard entries");

    let workouts = generate_workouts(rng, now)?;
    let inserted = db.insert_many(collections::WORKOUTS, &workouts).await?;
    tracing::info!(count = inserted.len(), "Inserted workouts");

    let report = PopulationReport {
        users: db.count(collections::USERS).await?,
        teams: db.count(collections::TEAMS).await?,
        activities: db.count(collections::ACTIVITIES).await?,
        leaderboard: db.count(collections::LEADERBOARD).await?,
        workouts: db.count(collections::WORKOUTS).await?,
    };

    tracing::info!(
        users = report.users,
        teams = report.teams,
        activities = report.activities,
        leaderboard = report.leaderboard,
        workouts = report.workouts,
        "Database population complete"
    );

    Ok(report)
}
