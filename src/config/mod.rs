use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub platform: PlatformConfig,
    pub site_url: String,
    pub port: u16,
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
    pub connect_timeout_secs: u64,
}

/// Connection details for the hosted backend platform that serves both
/// the identity provider (`/auth/v1`) and object storage (`/storage/v1`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    pub url: String,
    pub anon_key: String,
    pub service_role_key: String,
}

impl AppConfig {
    /// Build configuration from the process environment. The database URL
    /// and the platform URL/service-role key are hard requirements; startup
    /// fails without them.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let database_url = env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
        let platform_url = env::var("PLATFORM_URL").map_err(|_| ConfigError::Missing("PLATFORM_URL"))?;
        let service_role_key =
            env::var("PLATFORM_SERVICE_ROLE_KEY").map_err(|_| ConfigError::Missing("PLATFORM_SERVICE_ROLE_KEY"))?;

        let mut config = Self {
            database: DatabaseConfig {
                url: database_url,
                max_connections: match environment {
                    Environment::Production => 50,
                    Environment::Staging => 20,
                    Environment::Development => 10,
                },
                connect_timeout_secs: match environment {
                    Environment::Production => 5,
                    _ => 30,
                },
            },
            platform: PlatformConfig {
                url: platform_url.trim_end_matches('/').to_string(),
                anon_key: env::var("PLATFORM_ANON_KEY").unwrap_or_default(),
                service_role_key,
            },
            site_url: env::var("SITE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string()),
            port: 3000,
            environment,
        };

        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            config.database.max_connections = v.parse().unwrap_or(config.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECT_TIMEOUT_SECS") {
            config.database.connect_timeout_secs = v.parse().unwrap_or(config.database.connect_timeout_secs);
        }
        if let Ok(v) = env::var("PORT") {
            config.port = v.parse().unwrap_or(config.port);
        }

        Ok(config)
    }
}
