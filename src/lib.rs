// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! OctoFit Tracker: users, teams, activities, workouts and a calorie
//! leaderboard for a fitness-tracking app.
//!
//! This crate provides the REST API and the population command that seeds
//! fixture data and computes the leaderboard snapshot.

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Database;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Database,
}
