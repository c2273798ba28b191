// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod leaderboard;
pub mod populate;
pub mod random;

pub use leaderboard::{build_leaderboard, team_standings};
pub use populate::{populate, PopulationReport};
pub use random::{RandomSource, SystemRandomSource};
