// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API input validation tests.

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::{json_body, post_json};

#[tokio::test]
async fn test_user_invalid_email() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(post_json(
            "/api/users/",
            json!({"name": "X", "email": "not-an-email", "team": "T", "role": "Cardio"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "validation_error");
}

#[tokio::test]
async fn test_user_name_too_long() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(post_json(
            "/api/users/",
            json!({"name": "a".repeat(201), "email": "a@x.com", "team": "T"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_activity_non_positive_values_rejected() {
    let (app, _) = common::create_test_app();

    for (duration, calories, distance) in [(0, 100, 1.0), (30, -5, 1.0), (30, 100, -0.5)] {
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/activities/",
                json!({
                    "user_email": "a@x.com",
                    "activity_type": "Boxing",
                    "duration_minutes": duration,
                    "calories_burned": calories,
                    "distance_km": distance
                }),
            ))
            .await
            .unwrap();

        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "duration={} calories={} distance={}",
            duration,
            calories,
            distance
        );
        assert_eq!(json_body(response).await["error"], "validation_error");
    }
}
