// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Populate the database with fixture users, teams, activities, workouts
//! and the initial leaderboard.

use octofit_tracker::{
    config::Config,
    db::Database,
    logging,
    services::{populate, SystemRandomSource},
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let config = Config::from_env()?;
    let db = Database::connect(&config).await?;
    tracing::info!(
        backend = db.backend_name(),
        project = %config.gcp_project_id,
        "Connected to storage"
    );

    let mut rng = SystemRandomSource::new();
    let report = match populate(&db, &mut rng).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, "Population failed");
            return Err(e.into());
        }
    };

    println!("\n=== Database Population Complete ===");
    println!("Users: {}", report.users);
    println!("Teams: {}", report.teams);
    println!("Activities: {}", report.activities);
    println!("Leaderboard: {}", report.leaderboard);
    println!("Workouts: {}", report.workouts);

    Ok(())
}
