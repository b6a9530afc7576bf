//! Ticket assignment against an in-process stand-in for the user-service,
//! pinning the split between "pick a different user" (400) and "the
//! user-service itself is failing" (502).
//!
//! A single test function: the user-service base URL is read from the
//! environment once, so it must be set before anything touches config.

mod common;

use anyhow::Result;
use axum::extract::Path;
use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tower::ServiceExt;

use common::{body_json, lazy_state, request, token_for};

async fn mock_user_lookup(Path(username): Path<String>) -> impl IntoResponse {
    match username.as_str() {
        "customer1" => (
            StatusCode::OK,
            Json(json!({
                "user": { "id": 42, "username": "customer1", "role": "user" }
            })),
        ),
        "flaky" => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"message": "boom"}))),
        _ => (StatusCode::NOT_FOUND, Json(json!({"message": "User not found"}))),
    }
}

#[tokio::test]
async fn assignment_separates_bad_targets_from_outages() -> Result<()> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    std::env::set_var("USER_SERVICE_URL", format!("http://{}", addr));

    let mock = Router::new().route("/api/users/by-username/:username", get(mock_user_lookup));
    tokio::spawn(async move {
        axum::serve(listener, mock).await.ok();
    });

    let token = token_for("support_lead");

    // Unknown username: the lookup 404s, which is a bad target, not an outage.
    let response = support_api::app(lazy_state())
        .oneshot(request(
            Method::PUT,
            "/api/support/tickets/5/assign",
            Some(&token),
            Some(json!({"username": "ghost"})),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await?;
    assert_eq!(body["error"], "'ghost' is not a valid support agent");

    // Known user with a non-staff role fails the same way.
    let response = support_api::app(lazy_state())
        .oneshot(request(
            Method::PUT,
            "/api/support/tickets/5/assign",
            Some(&token),
            Some(json!({"username": "customer1"})),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await?;
    assert_eq!(body["error"], "'customer1' is not a valid support agent");

    // A 5xx from the user-service is an outage and surfaces as 502.
    let response = support_api::app(lazy_state())
        .oneshot(request(
            Method::PUT,
            "/api/support/tickets/5/assign",
            Some(&token),
            Some(json!({"username": "flaky"})),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await?;
    assert_eq!(body["code"], "DEPENDENCY_UNAVAILABLE");

    Ok(())
}
