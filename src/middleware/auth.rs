use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::auth::{verify_token, Claims};
use crate::config;
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated caller context attached to the request after the gate.
/// `token` keeps the raw bearer so downstream cross-service calls can
/// forward the caller's credentials.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub role: String,
    pub token: String,
}

impl AuthUser {
    fn from_claims(claims: Claims, token: String) -> Self {
        Self {
            id: claims.id,
            username: claims.username,
            role: claims.role,
            token,
        }
    }
}

/// Bearer-token authentication gate.
///
/// Verifies the token locally against the shared secret first; when that
/// fails (stale or missing secret copy) it delegates to the user-service's
/// check endpoint. The fallback trades an extra network round-trip for
/// availability.
pub async fn auth_gate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(request.headers())
        .map_err(|_| ApiError::unauthorized("Authentication credentials required"))?;

    let auth_user = match verify_token(&token) {
        Ok(claims) => AuthUser::from_claims(claims, token),
        Err(local_err) => {
            debug!("local token verification failed, delegating: {}", local_err);
            check_with_user_service(&state, &token).await?
        }
    };

    request.extensions_mut().insert(auth_user);
    Ok(next.run(request).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<String, ()> {
    let auth_str = headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(())?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.to_string()),
        _ => Err(()),
    }
}

/// Delegate verification to the user-service. Any non-2xx or malformed
/// response is an authentication failure, surfacing the remote message
/// when one is available.
async fn check_with_user_service(state: &AppState, token: &str) -> Result<AuthUser, ApiError> {
    let url = format!(
        "{}/api/auth/check",
        config::config().services.user_service_url
    );

    let body = state
        .services
        .get_json("user-service", &url, token)
        .await
        .map_err(|e| {
            use crate::services::client::ServiceError;
            match e {
                ServiceError::BadStatus { message, .. } => ApiError::unauthorized(message),
                _ => ApiError::unauthorized("Invalid or expired token"),
            }
        })?;

    let user = body
        .get("user")
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired token"))?;

    let id = user.get("id").and_then(|v| v.as_i64());
    let username = user.get("username").and_then(|v| v.as_str());
    let role = user.get("role").and_then(|v| v.as_str());

    match (id, username, role) {
        (Some(id), Some(username), Some(role)) => Ok(AuthUser {
            id,
            username: username.to_string(),
            role: role.to_string(),
            token: token.to_string(),
        }),
        _ => Err(ApiError::unauthorized("Invalid or expired token")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_extraction() {
        assert_eq!(
            extract_bearer(&headers_with("Bearer abc.def.ghi")).unwrap(),
            "abc.def.ghi"
        );
        assert!(extract_bearer(&headers_with("Basic abc")).is_err());
        assert!(extract_bearer(&headers_with("Bearer ")).is_err());
        assert!(extract_bearer(&HeaderMap::new()).is_err());
    }
}
