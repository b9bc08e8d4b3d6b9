//! Configuration management

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::constants::{
    DEFAULT_ACCESS_TOKEN_EXPIRY, DEFAULT_MAX_CHILDREN_PER_PARENT, DEFAULT_MAX_MENUS,
    DEFAULT_REQUEST_TIMEOUT_SECS,
};
use crate::error::AppError;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    pub hierarchy: HierarchySettings,
    pub http: HttpSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub host: String,
    pub port: u16,
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    /// `memory` or `postgres`
    pub backend: String,
    pub url: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    /// Access token lifetime in seconds.
    pub access_token_expiry: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HierarchySettings {
    pub max_menus: usize,
    pub max_children_per_parent: usize,
    /// `orphan`, `cascade` or `reparent`
    pub orphan_policy: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpSettings {
    pub request_timeout_secs: u64,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
    pub directory: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let config = Config::builder()
            .set_default("app.env", env.as_str())?
            .set_default("app.host", "127.0.0.1")?
            .set_default("app.port", 5000)?
            .set_default("app.name", "navhub-server")?
            .set_default("database.backend", "memory")?
            .set_default("database.max_connections", 10)?
            .set_default("database.acquire_timeout_secs", 3)?
            .set_default("jwt.access_token_expiry", DEFAULT_ACCESS_TOKEN_EXPIRY)?
            .set_default("hierarchy.max_menus", DEFAULT_MAX_MENUS as u64)?
            .set_default(
                "hierarchy.max_children_per_parent",
                DEFAULT_MAX_CHILDREN_PER_PARENT as u64,
            )?
            .set_default("hierarchy.orphan_policy", "orphan")?
            .set_default("http.request_timeout_secs", DEFAULT_REQUEST_TIMEOUT_SECS)?
            .set_default("http.cors_origins", Vec::<String>::new())?
            .set_default("logging.level", "info")?
            .set_default("logging.json", true)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("NAVHUB")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("http.cors_origins")
                    .try_parsing(true),
            )
            .build()?;
        let config: AppConfig = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings that would leave the server unable to enforce its invariants.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.jwt.secret.trim().is_empty() {
            return Err(AppError::InvalidConfig("jwt.secret must not be empty".into()));
        }
        if self.jwt.access_token_expiry <= 0 {
            return Err(AppError::InvalidConfig(
                "jwt.access_token_expiry must be positive".into(),
            ));
        }
        if self.hierarchy.max_menus == 0 || self.hierarchy.max_children_per_parent == 0 {
            return Err(AppError::InvalidConfig(
                "hierarchy capacities must be at least 1".into(),
            ));
        }
        let policy = self.hierarchy.orphan_policy.trim().to_ascii_lowercase();
        if !matches!(policy.as_str(), "orphan" | "cascade" | "reparent") {
            return Err(AppError::InvalidConfig(format!(
                "unknown hierarchy.orphan_policy: {}",
                self.hierarchy.orphan_policy
            )));
        }
        match self.database.backend.as_str() {
            "memory" => {}
            "postgres" => {
                if self.database.url.as_deref().map_or(true, |u| u.trim().is_empty()) {
                    return Err(AppError::InvalidConfig(
                        "database.url is required for the postgres backend".into(),
                    ));
                }
            }
            other => {
                return Err(AppError::InvalidConfig(format!(
                    "unknown database.backend: {}",
                    other
                )))
            }
        }
        Ok(())
    }
}
