use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub services: ServicesConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub cors_origin: String,
}

/// Base URLs of sibling services plus retry knobs for outbound calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicesConfig {
    pub user_service_url: String,
    pub communication_service_url: String,
    pub analysis_service_url: String,
    pub retry_attempts: u32,
    pub retry_base_delay_ms: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        Self::defaults(environment).with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("CORS_ORIGIN") {
            self.security.cors_origin = v;
        }
        if let Ok(v) = env::var("USER_SERVICE_URL") {
            self.services.user_service_url = v;
        }
        if let Ok(v) = env::var("COMMUNICATION_SERVICE_URL") {
            self.services.communication_service_url = v;
        }
        if let Ok(v) = env::var("ANALYSIS_SERVICE_URL") {
            self.services.analysis_service_url = v;
        }
        if let Ok(v) = env::var("SERVICE_RETRY_ATTEMPTS") {
            self.services.retry_attempts = v.parse().unwrap_or(self.services.retry_attempts);
        }
        if let Ok(v) = env::var("SERVICE_RETRY_BASE_DELAY_MS") {
            self.services.retry_base_delay_ms =
                v.parse().unwrap_or(self.services.retry_base_delay_ms);
        }

        self
    }

    fn defaults(environment: Environment) -> Self {
        let max_connections = match environment {
            Environment::Production => 25,
            Environment::Staging => 15,
            Environment::Development => 10,
        };

        Self {
            environment,
            database: DatabaseConfig {
                url: "mysql://root@localhost:3306/realestate_support".to_string(),
                max_connections,
            },
            security: SecurityConfig {
                jwt_secret: "dev-shared-secret".to_string(),
                cors_origin: "http://localhost:5173".to_string(),
            },
            services: ServicesConfig {
                user_service_url: "http://localhost:4001".to_string(),
                communication_service_url: "http://localhost:4002".to_string(),
                analysis_service_url: "http://localhost:4003".to_string(),
                retry_attempts: 2,
                retry_base_delay_ms: 200,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_defaults() {
        let config = AppConfig::defaults(Environment::Development);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.services.user_service_url, "http://localhost:4001");
        assert_eq!(config.services.retry_attempts, 2);
    }

    #[test]
    fn production_defaults() {
        let config = AppConfig::defaults(Environment::Production);
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.database.max_connections, 25);
    }
}
