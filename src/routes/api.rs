// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! REST resources: users, teams, activities, leaderboard and workouts.
//!
//! Every resource has a list endpoint (`/api/<resource>/`) and a detail
//! endpoint (`/api/<resource>/{id}/`) returning the stored records as JSON.

use crate::db::collections;
use crate::error::{AppError, Result};
use crate::models::{
    Activity, LeaderboardEntry, NewActivity, NewUser, Team, TeamStanding, User, Workout,
};
use crate::services::leaderboard;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(api_root))
        .route("/api/", get(api_root))
        .route("/api/users/", get(list_users).post(create_user))
        .route("/api/users/{id}/", get(get_user))
        .route("/api/teams/", get(list_teams))
        .route("/api/teams/{id}/", get(get_team))
        .route("/api/activities/", get(list_activities).post(create_activity))
        .route("/api/activities/{id}/", get(get_activity))
        .route("/api/leaderboard/", get(list_leaderboard))
        .route("/api/leaderboard/teams/", get(list_team_standings))
        .route("/api/leaderboard/recompute/", post(recompute_leaderboard))
        .route("/api/leaderboard/{id}/", get(get_leaderboard_entry))
        .route("/api/workouts/", get(list_workouts))
        .route("/api/workouts/{id}/", get(get_workout))
}

// ─── API Root ────────────────────────────────────────────────

/// Map of resource name to list URL.
async fn api_root(State(state): State<Arc<AppState>>) -> Json<BTreeMap<&'static str, String>> {
    let base = &state.config.public_base_url;
    Json(
        collections::ALL
            .iter()
            .map(|name| (*name, format!("{}/api/{}/", base, name)))
            .collect(),
    )
}

// ─── Generic list/detail ─────────────────────────────────────

async fn list_all<T>(state: &AppState, collection: &str) -> Result<Json<Vec<T>>>
where
    T: DeserializeOwned + Send,
{
    let records: Vec<T> = state.db.list(collection).await?;
    tracing::debug!(collection, count = records.len(), "Listed records");
    Ok(Json(records))
}

async fn get_one<T>(state: &AppState, collection: &str, id: &str) -> Result<Json<T>>
where
    T: DeserializeOwned + Send,
{
    state
        .db
        .get(collection, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("{} {} not found", collection, id)))
}

// ─── Users ───────────────────────────────────────────────────

async fn list_users(State(state): State<Arc<AppState>>) -> Result<Json<Vec<User>>> {
    list_all(&state, collections::USERS).await
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<User>> {
    get_one(&state, collections::USERS, &id).await
}

/// Create a user. A second user with the same email is rejected (409).
async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewUser>,
) -> Result<(StatusCode, Json<User>)> {
    body.validate()?;

    let mut user = User::from(body);
    let ids = state
        .db
        .insert_many(collections::USERS, std::slice::from_ref(&user))
        .await?;
    user.id = ids.into_iter().next();

    tracing::info!(email = %user.email, team = %user.team, "User created");
    Ok((StatusCode::CREATED, Json(user)))
}

// ─── Teams ───────────────────────────────────────────────────

async fn list_teams(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Team>>> {
    list_all(&state, collections::TEAMS).await
}

async fn get_team(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Team>> {
    get_one(&state, collections::TEAMS, &id).await
}

// ─── Activities ──────────────────────────────────────────────

async fn list_activities(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Activity>>> {
    list_all(&state, collections::ACTIVITIES).await
}

async fn get_activity(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Activity>> {
    get_one(&state, collections::ACTIVITIES, &id).await
}

/// Record an activity for an existing user.
///
/// The user's name and team are copied onto the activity. The leaderboard
/// is a snapshot and is only updated by a recompute.
async fn create_activity(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewActivity>,
) -> Result<(StatusCode, Json<Activity>)> {
    body.validate()?;

    let owner: User = state
        .db
        .find_by(collections::USERS, "email", &body.user_email)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::BadRequest(format!("Unknown user email: {}", body.user_email)))?;

    let mut activity = Activity {
        id: None,
        user_email: owner.email,
        user_name: owner.name,
        team: owner.team,
        activity_type: body.activity_type,
        duration_minutes: body.duration_minutes,
        calories_burned: body.calories_burned,
        distance_km: body.distance_km,
        date: body.date.unwrap_or_else(chrono::Utc::now),
        notes: body.notes,
    };

    let ids = state
        .db
        .insert_many(collections::ACTIVITIES, std::slice::from_ref(&activity))
        .await?;
    activity.id = ids.into_iter().next();

    tracing::info!(
        user_email = %activity.user_email,
        activity_type = %activity.activity_type,
        calories = activity.calories_burned,
        "Activity recorded"
    );
    Ok((StatusCode::CREATED, Json(activity)))
}

// ─── Leaderboard ─────────────────────────────────────────────

/// Leaderboard entries ordered by rank.
async fn list_leaderboard(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<LeaderboardEntry>>> {
    let mut entries: Vec<LeaderboardEntry> = state.db.list(collections::LEADERBOARD).await?;
    entries.sort_by_key(|e| e.rank);
    Ok(Json(entries))
}

async fn get_leaderboard_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<LeaderboardEntry>> {
    get_one(&state, collections::LEADERBOARD, &id).await
}

/// Team totals derived from the current leaderboard snapshot.
async fn list_team_standings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TeamStanding>>> {
    let mut entries: Vec<LeaderboardEntry> = state.db.list(collections::LEADERBOARD).await?;
    entries.sort_by_key(|e| e.rank);
    Ok(Json(leaderboard::team_standings(&entries)))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "frontend/src/generated/")
)]
pub struct RecomputeResponse {
    pub entries: u32,
    pub last_updated: String,
}

/// Rebuild the leaderboard from stored users and activities.
async fn recompute_leaderboard(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RecomputeResponse>> {
    let entries = leaderboard::recompute(&state.db).await?;
    let last_updated = entries
        .first()
        .map(|e| e.last_updated)
        .unwrap_or_else(chrono::Utc::now);

    Ok(Json(RecomputeResponse {
        entries: entries.len() as u32,
        last_updated: format_utc_rfc3339(last_updated),
    }))
}

// ─── Workouts ────────────────────────────────────────────────

async fn list_workouts(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Workout>>> {
    list_all(&state, collections::WORKOUTS).await
}

async fn get_workout(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Workout>> {
    get_one(&state, collections::WORKOUTS, &id).await
}
