//! Router-level tests covering the gate and validation paths. The pool is
//! lazy and never connects: every request here is expected to resolve
//! before any SQL would run.

mod common;

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use common::{body_json, lazy_state, request, token_for};
use support_api::realtime::RealtimeEvent;

fn test_app() -> axum::Router {
    support_api::app(lazy_state())
}

#[tokio::test]
async fn health_is_public_and_always_ok() -> Result<()> {
    let response = test_app()
        .oneshot(request(Method::GET, "/health", None, None))
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn ticket_listing_requires_credentials() -> Result<()> {
    let response = test_app()
        .oneshot(request(Method::GET, "/api/support/tickets", None, None))
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Authentication credentials required");
    Ok(())
}

#[tokio::test]
async fn non_bearer_authorization_is_rejected() -> Result<()> {
    let response = test_app()
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/api/support/tickets")
                .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
                .body(Body::empty())
                .unwrap(),
        )
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn agent_cannot_change_ticket_status() -> Result<()> {
    let token = token_for("support_agent");
    let response = test_app()
        .oneshot(request(
            Method::PUT,
            "/api/support/tickets/5/status",
            Some(&token),
            Some(json!({"status": "resolved"})),
        ))
        .await?;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Support lead role required");
    Ok(())
}

#[tokio::test]
async fn customer_role_fails_every_staff_gate() -> Result<()> {
    let token = token_for("user");
    let response = test_app()
        .oneshot(request(
            Method::GET,
            "/api/support/tickets",
            Some(&token),
            None,
        ))
        .await?;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn generic_admin_satisfies_lead_gate() -> Result<()> {
    // Passing the role gate and then failing input validation proves the
    // admin alias ranks above lead.
    let token = token_for("admin");
    let response = test_app()
        .oneshot(request(
            Method::PUT,
            "/api/support/tickets/5/status",
            Some(&token),
            Some(json!({})),
        ))
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await?;
    assert_eq!(body["error"], "Status is required");
    Ok(())
}

#[tokio::test]
async fn missing_status_yields_400_without_persisting() -> Result<()> {
    let token = token_for("support_lead");
    let response = test_app()
        .oneshot(request(
            Method::PUT,
            "/api/support/tickets/5/status",
            Some(&token),
            Some(json!({})),
        ))
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await?;
    assert_eq!(body["error"], "Status is required");
    Ok(())
}

#[tokio::test]
async fn unknown_status_yields_400() -> Result<()> {
    let token = token_for("support_lead");
    let response = test_app()
        .oneshot(request(
            Method::PUT,
            "/api/support/tickets/5/status",
            Some(&token),
            Some(json!({"status": "reopened"})),
        ))
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await?;
    assert_eq!(body["error"], "Invalid status 'reopened'");
    Ok(())
}

#[tokio::test]
async fn respond_requires_response_text() -> Result<()> {
    let token = token_for("support_agent");
    let response = test_app()
        .oneshot(request(
            Method::POST,
            "/api/support/tickets/5/respond",
            Some(&token),
            Some(json!({"responder_username": "agent1"})),
        ))
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await?;
    assert_eq!(body["error"], "Response text is required");
    Ok(())
}

#[tokio::test]
async fn respond_rejects_unknown_priority() -> Result<()> {
    let token = token_for("support_agent");
    let response = test_app()
        .oneshot(request(
            Method::POST,
            "/api/support/tickets/5/respond",
            Some(&token),
            Some(json!({"response": "Please try again", "priority": "critical"})),
        ))
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await?;
    assert_eq!(body["error"], "Invalid priority 'critical'");
    Ok(())
}

#[tokio::test]
async fn ticket_assignment_requires_username() -> Result<()> {
    let token = token_for("support_lead");
    let response = test_app()
        .oneshot(request(
            Method::PUT,
            "/api/support/tickets/5/assign",
            Some(&token),
            Some(json!({})),
        ))
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await?;
    assert_eq!(body["error"], "Username is required");
    Ok(())
}

#[tokio::test]
async fn flag_resolution_rejects_unknown_action() -> Result<()> {
    let token = token_for("support_agent");
    let response = test_app()
        .oneshot(request(
            Method::PUT,
            "/api/support/flagged-content/9/resolve",
            Some(&token),
            Some(json!({"action": "escalate"})),
        ))
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await?;
    assert_eq!(body["error"], "Invalid action 'escalate'");
    Ok(())
}

#[tokio::test]
async fn review_creation_requires_all_fields() -> Result<()> {
    let token = token_for("support_agent");
    let response = test_app()
        .oneshot(request(
            Method::POST,
            "/api/support/reviews",
            Some(&token),
            Some(json!({"rating": 5})),
        ))
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await?;
    assert_eq!(body["error"], "user_id is required");
    Ok(())
}

#[tokio::test]
async fn faq_creation_requires_title() -> Result<()> {
    let token = token_for("support_agent");
    let response = test_app()
        .oneshot(request(
            Method::POST,
            "/api/support/faqs",
            Some(&token),
            Some(json!({"answer": "Use the reset link."})),
        ))
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await?;
    assert_eq!(body["error"], "Title is required");
    Ok(())
}

#[tokio::test]
async fn faq_deletion_is_lead_tier() -> Result<()> {
    let token = token_for("support_agent");
    let response = test_app()
        .oneshot(request(
            Method::DELETE,
            "/api/support/faqs/3",
            Some(&token),
            None,
        ))
        .await?;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn activity_relay_broadcasts_to_subscribers() -> Result<()> {
    let state = lazy_state();
    let broadcaster = state.broadcaster.clone();
    let app = support_api::app(state);
    let mut rx = broadcaster.subscribe();

    let token = token_for("support_agent");
    let response = app
        .oneshot(request(
            Method::POST,
            "/api/support/events/activity",
            Some(&token),
            Some(json!({"type": "market_pulse", "region": "north"})),
        ))
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await?;
    assert_eq!(body["data"]["broadcast"], true);

    match rx.try_recv()? {
        RealtimeEvent::ActivityUpdate { activity } => {
            assert_eq!(activity["type"], "market_pulse");
        }
        other => panic!("unexpected event: {:?}", other),
    }
    Ok(())
}
