//! Configuration management

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::constants::{DEFAULT_DB_MAX_CONNECTIONS, DEFAULT_REFRESH_TOKEN_TTL_HOURS};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub credentials: CredentialSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CredentialSettings {
    /// Lifetime of newly issued refresh tokens, in hours.
    pub refresh_token_ttl_hours: i64,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let config = Config::builder()
            .set_default("app.env", "development")?
            .set_default("app.name", "pulselog")?
            .set_default("database.url", "postgres://localhost/pulselog")?
            .set_default("database.max_connections", DEFAULT_DB_MAX_CONNECTIONS as i64)?
            .set_default("database.min_connections", 1_i64)?
            .set_default(
                "credentials.refresh_token_ttl_hours",
                DEFAULT_REFRESH_TOKEN_TTL_HOURS,
            )?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::default().separator("__").try_parsing(true))
            .build()?;
        config.try_deserialize()
    }
}
