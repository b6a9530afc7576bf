#![allow(dead_code)]

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Method, Request};
use serde_json::Value;

use support_api::auth::{generate_token, Claims};
use support_api::realtime::Broadcaster;
use support_api::services::client::ServiceClient;
use support_api::state::AppState;

/// State with a lazy pool that never connects; for tests exercising paths
/// that resolve before any SQL runs.
pub fn lazy_state() -> AppState {
    let pool = sqlx::mysql::MySqlPoolOptions::new()
        .connect_lazy("mysql://root@localhost:3306/support_test")
        .expect("lazy pool");

    AppState::new(pool, ServiceClient::new(0, 10), Broadcaster::new(16))
}

pub fn token_for(role: &str) -> String {
    let claims = Claims::new(1, "tester".to_string(), role.to_string());
    generate_token(&claims).expect("token")
}

pub fn request(
    method: Method,
    uri: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn body_json(response: axum::response::Response) -> Result<Value> {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}
