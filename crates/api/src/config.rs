use std::env;

use thiserror::Error;

const DEV_JWT_SECRET: &str = "dev-secret-only-for-local-testing";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error(transparent)]
    Source(#[from] config::ConfigError),
    #[error("JWT_SECRET must be set in production")]
    MissingJwtSecret,
}

/// Runtime settings for the HTTP server.
#[derive(Debug, Clone)]
pub struct Config {
    pub environment: String,
    pub database_url: String,
    pub bind_addr: String,
    pub jwt_secret: String,
}

impl Config {
    /// Layered load: `.env`, then `config/{APP_ENV}.toml`, then `APP__*`
    /// variables, then the bare `DATABASE_URL` / `BIND_ADDR` / `JWT_SECRET`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Source` for unreadable config files and
    /// `ConfigError::MissingJwtSecret` when running with `APP_ENV=prod`
    /// without a secret.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        let settings = config::Config::builder()
            .add_source(config::File::with_name(&format!("config/{environment}")).required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        let database_url = settings
            .get_string("database.url")
            .or_else(|_| env::var("DATABASE_URL"))
            .unwrap_or_else(|_| "sqlite:kotoba.sqlite3".to_string());

        let bind_addr = settings
            .get_string("server.bind_addr")
            .or_else(|_| env::var("BIND_ADDR"))
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string());

        let jwt_secret = match settings
            .get_string("auth.jwt_secret")
            .or_else(|_| env::var("JWT_SECRET"))
        {
            Ok(secret) => secret,
            Err(_) if environment == "prod" => return Err(ConfigError::MissingJwtSecret),
            Err(_) => {
                tracing::warn!("using default JWT secret (dev mode only)");
                DEV_JWT_SECRET.to_string()
            }
        };

        Ok(Self {
            environment,
            database_url,
            bind_addr,
            jwt_secret,
        })
    }

    /// Settings for tests and embedded use: in-process values, no files.
    #[must_use]
    pub fn with_secret(jwt_secret: impl Into<String>) -> Self {
        Self {
            environment: "test".to_string(),
            database_url: "sqlite::memory:".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            jwt_secret: jwt_secret.into(),
        }
    }
}
