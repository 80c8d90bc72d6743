use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

const MAX_ACCESS_TOKEN_TTL_SECS: i64 = 7 * 24 * 3600;
const MAX_REFRESH_TOKEN_TTL_DAYS: i64 = 3650;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Location of the JSON state file.
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub access_token_ttl_secs: i64,
    pub refresh_token_ttl_days: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub enabled: bool,
    pub allow_any_origin: bool,
    pub max_age: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub environment: String,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub cors: CorsConfig,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Self::with_defaults(Config::builder(), "development")?
            // Add in settings from the config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // E.g., `APP_SERVER__PORT=5001` would set `Settings.server.port`
            .add_source(
                Environment::with_prefix("app")
                    .separator("__")
                    .try_parsing(true)
            )
            // The bare JWT_SECRET variable from `.env` wins over everything else
            .set_override_option("auth.jwt_secret", env::var("JWT_SECRET").ok())?
            .build()?;

        let settings: Self = s.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    #[cfg(test)]
    pub fn new_for_test() -> Result<Self, ConfigError> {
        let settings: Self = Self::with_defaults(Config::builder(), "test")?
            .set_override("database.path", "test-database.json")?
            .set_override("auth.jwt_secret", "test_secret")?
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Rejects token lifetimes outside what the token service can represent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let access = self.auth.access_token_ttl_secs;
        if !(1..=MAX_ACCESS_TOKEN_TTL_SECS).contains(&access) {
            return Err(ConfigError::Message(format!(
                "auth.access_token_ttl_secs must be between 1 and {}, got {}",
                MAX_ACCESS_TOKEN_TTL_SECS, access
            )));
        }

        let refresh = self.auth.refresh_token_ttl_days;
        if !(1..=MAX_REFRESH_TOKEN_TTL_DAYS).contains(&refresh) {
            return Err(ConfigError::Message(format!(
                "auth.refresh_token_ttl_days must be between 1 and {}, got {}",
                MAX_REFRESH_TOKEN_TTL_DAYS, refresh
            )));
        }
        Ok(())
    }

    fn with_defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
        environment: &str,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        builder
            .set_default("environment", environment)?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.workers", num_cpus::get() as i64)?
            .set_default("database.path", "database.json")?
            .set_default("auth.jwt_secret", "development_secret")?
            .set_default("auth.access_token_ttl_secs", 3600)?
            .set_default("auth.refresh_token_ttl_days", 60)?
            .set_default("cors.enabled", true)?
            .set_default("cors.allow_any_origin", true)?
            .set_default("cors.max_age", 3600)
    }

    pub fn access_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.auth.access_token_ttl_secs)
    }

    pub fn refresh_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.auth.refresh_token_ttl_days)
    }
}
