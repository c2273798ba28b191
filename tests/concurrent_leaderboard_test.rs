// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::Utc;
use octofit_tracker::db::{collections, Database};
use octofit_tracker::error::AppError;
use octofit_tracker::models::{Activity, LeaderboardEntry, User};
use octofit_tracker::services::{leaderboard, populate, SystemRandomSource};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

const NUM_USERS: usize = 25;
const NUM_PUBLISHES: usize = 20;
const NUM_POPULATIONS: usize = 5;
const NUM_READERS: usize = 8;

fn fixture() -> (Vec<User>, Vec<Activity>) {
    let users: Vec<User> = (0..NUM_USERS)
        .map(|i| {
            User::new(
                &format!("User {}", i),
                &format!("user{}@example.com", i),
                if i % 2 == 0 { "Even" } else { "Odd" },
                "Cardio",
            )
        })
        .collect();

    let activities = users
        .iter()
        .enumerate()
        .map(|(i, u)| Activity {
            id: None,
            user_email: u.email.clone(),
            user_name: u.name.clone(),
            team: u.team.clone(),
            activity_type: "Running".to_string(),
            duration_minutes: 30,
            calories_burned: 100 + i as i64,
            distance_km: 5.0,
            date: Utc::now(),
            notes: String::new(),
        })
        .collect();

    (users, activities)
}

/// Read the leaderboard and check it is one complete snapshot.
async fn assert_complete(db: &Database, expected_len: usize) {
    let entries: Vec<LeaderboardEntry> = db
        .list(collections::LEADERBOARD)
        .await
        .expect("Failed to read leaderboard");

    assert_eq!(
        entries.len(),
        expected_len,
        "Reader saw {} leaderboard entries",
        entries.len()
    );

    let mut ranks: Vec<u32> = entries.iter().map(|e| e.rank).collect();
    ranks.sort_unstable();
    assert_eq!(ranks, (1..=expected_len as u32).collect::<Vec<_>>());

    let generation = entries[0].last_updated;
    assert!(entries.iter().all(|e| e.last_updated == generation));
}

/// Spawn readers that check the leaderboard until `done` is set (at least once each).
fn spawn_readers(
    db: &Database,
    expected_len: usize,
    done: &Arc<AtomicBool>,
    reads: &Arc<AtomicUsize>,
) -> Vec<tokio::task::JoinHandle<()>> {
    (0..NUM_READERS)
        .map(|_| {
            let db = db.clone();
            let done = done.clone();
            let reads = reads.clone();
            tokio::spawn(async move {
                loop {
                    assert_complete(&db, expected_len).await;
                    reads.fetch_add(1, Ordering::Relaxed);
                    if done.load(Ordering::Acquire) {
                        break;
                    }
                    tokio::task::yield_now().await;
                }
            })
        })
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_readers_never_see_partial_leaderboard() {
    let db = Database::memory();
    let (users, activities) = fixture();

    // Seed the first snapshot before any reader starts
    leaderboard::publish(&db, &users, &activities, Utc::now())
        .await
        .unwrap();

    let done = Arc::new(AtomicBool::new(false));
    let reads = Arc::new(AtomicUsize::new(0));
    let readers = spawn_readers(&db, NUM_USERS, &done, &reads);

    let writer = {
        let db = db.clone();
        tokio::spawn(async move {
            for _ in 0..NUM_PUBLISHES {
                leaderboard::publish(&db, &users, &activities, Utc::now()).await?;
                tokio::task::yield_now().await;
            }
            Ok::<_, AppError>(())
        })
    };

    writer
        .await
        .expect("Writer join failed")
        .expect("Publish failed");
    done.store(true, Ordering::Release);
    for reader in readers {
        reader.await.expect("Reader failed");
    }

    assert!(reads.load(Ordering::Relaxed) >= NUM_READERS);

    let final_entries: Vec<LeaderboardEntry> = db.list(collections::LEADERBOARD).await.unwrap();
    assert_eq!(final_entries.len(), NUM_USERS);
    let leader = final_entries.iter().find(|e| e.rank == 1).unwrap();
    assert_eq!(leader.user_email, format!("user{}@example.com", NUM_USERS - 1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_repopulation_never_empties_leaderboard() {
    let db = Database::memory();
    let mut rng = SystemRandomSource::new();
    populate(&db, &mut rng).await.unwrap();

    let done = Arc::new(AtomicBool::new(false));
    let reads = Arc::new(AtomicUsize::new(0));
    let readers = spawn_readers(&db, 12, &done, &reads);

    for _ in 0..NUM_POPULATIONS {
        populate(&db, &mut rng).await.unwrap();
        tokio::task::yield_now().await;
    }

    done.store(true, Ordering::Release);
    for reader in readers {
        reader.await.expect("Reader saw an incomplete leaderboard");
    }

    assert!(reads.load(Ordering::Relaxed) >= NUM_READERS);
}
