// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod leaderboard;
pub mod team;
pub mod user;
pub mod workout;

pub use activity::{Activity, NewActivity};
pub use leaderboard::{LeaderboardEntry, TeamStanding};
pub use team::Team;
pub use user::{NewUser, User};
pub use workout::Workout;
