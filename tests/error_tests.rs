// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use octofit_tracker::error::AppError;

fn status_of(err: AppError) -> StatusCode {
    err.into_response().status()
}

#[test]
fn test_client_error_status() {
    assert_eq!(
        status_of(AppError::NotFound("users x".to_string())),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        status_of(AppError::BadRequest("bad".to_string())),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        status_of(AppError::Validation("email".to_string())),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        status_of(AppError::DuplicateKey("users.email".to_string())),
        StatusCode::CONFLICT
    );
}

#[test]
fn test_server_error_status() {
    assert_eq!(
        status_of(AppError::StorageUnavailable("offline".to_string())),
        StatusCode::SERVICE_UNAVAILABLE
    );
    assert_eq!(
        status_of(AppError::Database("boom".to_string())),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        status_of(AppError::Internal(anyhow::anyhow!("boom"))),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[tokio::test]
async fn test_server_error_hides_details() {
    let response = AppError::Database("connection string with secrets".to_string()).into_response();
    let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["error"], "database_error");
    assert!(json.get("details").is_none());
}

#[test]
fn test_validation_errors_convert() {
    use validator::Validate;

    let body = octofit_tracker::models::NewUser {
        name: "X".to_string(),
        email: "nope".to_string(),
        team: "T".to_string(),
        role: String::new(),
    };
    let err: AppError = body.validate().unwrap_err().into();

    assert!(matches!(err, AppError::Validation(_)));
}
