use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config;

/// Claims carried by tokens minted by the user-service. The shared secret
/// lets this service verify them locally without a network round-trip.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub id: i64,
    pub username: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(id: i64, username: String, role: String) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(24)).timestamp();

        Self {
            id,
            username,
            role,
            exp,
            iat: now.timestamp(),
        }
    }
}

/// Support staff tiers, least to most privileged. Gates compare with
/// `>=` so a higher tier always satisfies a lower gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SupportRole {
    Agent,
    Lead,
    Admin,
    SuperAdmin,
}

impl SupportRole {
    /// Map a role string from a token or the user-service to a tier.
    /// Both the generic `admin` and `support_admin` land on the same tier.
    pub fn parse(role: &str) -> Option<Self> {
        match role {
            "support_agent" => Some(SupportRole::Agent),
            "support_lead" => Some(SupportRole::Lead),
            "support_admin" | "admin" => Some(SupportRole::Admin),
            "super_admin" => Some(SupportRole::SuperAdmin),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SupportRole::Agent => "support agent",
            SupportRole::Lead => "support lead",
            SupportRole::Admin => "support admin",
            SupportRole::SuperAdmin => "super admin",
        }
    }
}

pub fn generate_token(claims: &Claims) -> Result<String, jsonwebtoken::errors::Error> {
    let secret = &config::config().security.jwt_secret;
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Validate a token against the shared secret and extract its claims.
pub fn verify_token(token: &str) -> Result<Claims, String> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err("JWT secret not configured".to_string());
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| format!("Invalid token: {}", e))?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_are_ordered() {
        assert!(SupportRole::Agent < SupportRole::Lead);
        assert!(SupportRole::Lead < SupportRole::Admin);
        assert!(SupportRole::Admin < SupportRole::SuperAdmin);
    }

    #[test]
    fn admin_aliases_map_to_the_same_tier() {
        assert_eq!(SupportRole::parse("admin"), Some(SupportRole::Admin));
        assert_eq!(SupportRole::parse("support_admin"), Some(SupportRole::Admin));
    }

    #[test]
    fn non_staff_roles_do_not_parse() {
        assert_eq!(SupportRole::parse("user"), None);
        assert_eq!(SupportRole::parse(""), None);
        assert_eq!(SupportRole::parse("Agent"), None);
    }

    #[test]
    fn token_round_trip() {
        let claims = Claims::new(7, "agent1".to_string(), "support_agent".to_string());
        let token = generate_token(&claims).expect("token");
        let decoded = verify_token(&token).expect("claims");
        assert_eq!(decoded.id, 7);
        assert_eq!(decoded.username, "agent1");
        assert_eq!(decoded.role, "support_agent");
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(verify_token("not-a-jwt").is_err());
    }
}
