use axum::{extract::Request, middleware::Next, response::Response};

use crate::auth::SupportRole;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;

/// Role gates. Tiers are a single ordered enum, so each gate is just
/// "caller rank >= required rank"; a generic admin or super admin passes
/// every support gate. Gates assume the auth gate already ran and attached
/// an AuthUser extension.
async fn require(minimum: SupportRole, request: Request, next: Next) -> Result<Response, ApiError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication credentials required"))?;

    match SupportRole::parse(&auth_user.role) {
        Some(role) if role >= minimum => Ok(next.run(request).await),
        _ => Err(ApiError::forbidden(format!(
            "{} role required",
            capitalize(minimum.label())
        ))),
    }
}

pub async fn require_agent(request: Request, next: Next) -> Result<Response, ApiError> {
    require(SupportRole::Agent, request, next).await
}

pub async fn require_lead(request: Request, next: Next) -> Result<Response, ApiError> {
    require(SupportRole::Lead, request, next).await
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalize_label() {
        assert_eq!(capitalize("support lead"), "Support lead");
        assert_eq!(capitalize(""), "");
    }
}
