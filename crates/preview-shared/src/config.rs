//! Configuration management

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants;
use crate::error::AppError;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub server: ServerSettings,
    pub store: StoreSettings,
    pub session: SessionSettings,
    pub admin: AdminSettings,
    pub cache: CacheSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Marks the session cookie `Secure`. Only disable for plain-HTTP local development.
    pub secure_cookies: bool,
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Redis,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreSettings {
    pub backend: StoreBackend,
    pub redis_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionSettings {
    pub anonymous_ttl_secs: u64,
    pub admin_ttl_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AdminSettings {
    /// Pre-provisioned admin credential (64 hex chars). Generated at startup when absent.
    pub token: Option<String>,
    pub token_file: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheSettings {
    pub root: PathBuf,
    pub source_root: PathBuf,
    pub allowed_extensions: Vec<String>,
    pub max_upload_bytes: u64,
    pub reclaim_delay_ms: u64,
    pub fetch_timeout_secs: u64,
}

impl SessionSettings {
    pub fn anonymous_ttl(&self) -> Duration {
        Duration::from_secs(self.anonymous_ttl_secs)
    }

    pub fn admin_ttl(&self) -> Duration {
        Duration::from_secs(self.admin_ttl_secs)
    }
}

impl CacheSettings {
    pub fn reclaim_delay(&self) -> Duration {
        Duration::from_millis(self.reclaim_delay_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, AppError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let cfg: Self = Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("PREVIEW")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cache.allowed_extensions")
                    .with_list_parse_key("server.cors_origins")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject settings the services cannot work with
    pub fn validate(&self) -> Result<(), AppError> {
        if self.cache.allowed_extensions.iter().all(|e| e.trim().trim_start_matches('.').is_empty()) {
            return Err(AppError::InvalidConfig("cache.allowed_extensions is empty".into()));
        }
        if self.cache.max_upload_bytes == 0 {
            return Err(AppError::InvalidConfig("cache.max_upload_bytes must be positive".into()));
        }
        if self.session.anonymous_ttl_secs == 0 || self.session.admin_ttl_secs == 0 {
            return Err(AppError::InvalidConfig("session ttls must be positive".into()));
        }
        Ok(())
    }

    /// Built-in defaults only, no files or environment.
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::builder()?.build()?.try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        let allowed: Vec<String> = constants::DEFAULT_ALLOWED_EXTENSIONS
            .iter()
            .map(|e| e.to_string())
            .collect();

        Config::builder()
            .set_default("app.env", "development")?
            .set_default("app.name", "preview-server")?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.secure_cookies", true)?
            .set_default("server.cors_origins", Vec::<String>::new())?
            .set_default("store.backend", "redis")?
            .set_default("store.redis_url", "redis://127.0.0.1:6379/0")?
            .set_default("session.anonymous_ttl_secs", constants::ANONYMOUS_SESSION_TTL_SECS)?
            .set_default("session.admin_ttl_secs", constants::ADMIN_SESSION_TTL_SECS)?
            .set_default("admin.token_file", "./admin.token")?
            .set_default("cache.root", "./image_cache")?
            .set_default("cache.source_root", "./images")?
            .set_default("cache.allowed_extensions", allowed)?
            .set_default("cache.max_upload_bytes", constants::MAX_UPLOAD_BYTES)?
            .set_default("cache.reclaim_delay_ms", constants::RECLAIM_DELAY_MS)?
            .set_default("cache.fetch_timeout_secs", constants::FETCH_TIMEOUT_SECS)
    }
}
