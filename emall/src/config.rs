//! Application configuration.
//!
//! Configuration is layered: a YAML file, then `EMALL_`-prefixed environment
//! variables (with `__` separating nesting levels, e.g.
//! `EMALL_AUTH__SESSION__COOKIE_NAME`), then a raw `DATABASE_URL` override.
//! `Config::load` extracts the merged figment and runs `validate()`.

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::fmt;
use std::time::Duration;
use url::Url;

use crate::errors::{Error, Result};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "emall", about = "Backend for the Emall marketing site and admin back office")]
pub struct Args {
    /// Path to the YAML configuration file
    #[arg(short = 'f', long, env = "EMALL_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate the configuration and exit
    #[arg(long, default_value_t = false)]
    pub validate: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Address to bind the HTTP server to
    pub host: String,
    pub port: u16,

    /// Raw DATABASE_URL override, merged from the environment. Applied to
    /// `database.url` during load.
    pub database_url: Option<String>,
    pub database: DatabaseConfig,

    /// Initial admin account, created idempotently at startup
    pub admin_email: String,
    pub admin_password: Option<String>,

    /// Secret used to sign session JWTs. Required.
    pub secret_key: Option<String>,

    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub uploads: UploadConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            database_url: None,
            database: DatabaseConfig::default(),
            admin_email: "admin@emall.local".to_string(),
            admin_password: None,
            secret_key: None,
            auth: AuthConfig::default(),
            storage: StorageConfig::default(),
            uploads: UploadConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool: PoolSettings,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost:5432/emall".to_string(),
            pool: PoolSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolSettings {
    pub max_connections: u32,
    #[serde(with = "humantime_serde")]
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    pub session: SessionConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Session cookie lifetime (Max-Age)
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    pub cookie_name: String,
    pub cookie_secure: bool,
    pub cookie_same_site: SameSite,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60 * 60 * 24),
            cookie_name: "emall_session".to_string(),
            cookie_secure: true,
            cookie_same_site: SameSite::Strict,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SameSite::Strict => write!(f, "Strict"),
            SameSite::Lax => write!(f, "Lax"),
            SameSite::None => write!(f, "None"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SecurityConfig {
    /// Lifetime of the session JWT itself
    #[serde(with = "humantime_serde")]
    pub jwt_expiry: Duration,
    pub cors: CorsConfig,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_expiry: Duration::from_secs(60 * 60 * 24),
            cors: CorsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    pub allowed_origins: Vec<CorsOrigin>,
    pub allow_credentials: bool,
    #[serde(with = "humantime_serde")]
    pub max_age: Duration,
    pub exposed_headers: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            // The admin frontend dev server; session cookies need credentials
            allowed_origins: vec![CorsOrigin::Url(Url::parse("http://localhost:3000").expect("static url"))],
            allow_credentials: true,
            max_age: Duration::from_secs(3600),
            exposed_headers: vec![],
        }
    }
}

/// An allowed CORS origin: either the `*` wildcard or a concrete URL
#[derive(Debug, Clone, PartialEq)]
pub enum CorsOrigin {
    Wildcard,
    Url(Url),
}

impl fmt::Display for CorsOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorsOrigin::Wildcard => write!(f, "*"),
            CorsOrigin::Url(url) => write!(f, "{url}"),
        }
    }
}

impl Serialize for CorsOrigin {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for CorsOrigin {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw == "*" {
            Ok(CorsOrigin::Wildcard)
        } else {
            Url::parse(&raw)
                .map(CorsOrigin::Url)
                .map_err(|e| de::Error::custom(format!("invalid CORS origin '{raw}': {e}")))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// CDN account name, part of the upload URL
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// Folder assets land in when the request does not name one
    pub upload_folder: String,
    /// Upload API base, overridable so tests can point at a local mock
    pub base_url: Url,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            cloud_name: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            upload_folder: "emall/rooms".to_string(),
            base_url: Url::parse("https://api.cloudinary.com").expect("static url"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadConfig {
    /// Maximum accepted file size in bytes
    pub max_file_size: u64,
    /// Accepted content types for the multipart `image` field
    pub allowed_types: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: 10 * 1024 * 1024,
            allowed_types: vec![
                "image/jpeg".to_string(),
                "image/png".to_string(),
                "image/webp".to_string(),
                "image/gif".to_string(),
                "image/avif".to_string(),
            ],
        }
    }
}

impl Config {
    /// Build the layered figment for this set of arguments
    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            .merge(Yaml::file(&args.config))
            .merge(Env::prefixed("EMALL_").split("__"))
            .merge(Env::raw().only(&["DATABASE_URL"]))
    }

    /// Load, apply the DATABASE_URL override, and validate
    pub fn load(args: &Args) -> Result<Self> {
        let mut config: Config = Self::figment(args).extract().map_err(|e| Error::Internal {
            operation: format!("load configuration: {e}"),
        })?;

        if let Some(url) = config.database_url.take() {
            config.database.url = url;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn validate(&self) -> Result<()> {
        if self.secret_key.as_deref().map(str::trim).unwrap_or_default().is_empty() {
            return Err(Error::Internal {
                operation: "validate config: secret_key is required to sign session tokens".to_string(),
            });
        }

        let jwt_expiry = self.auth.security.jwt_expiry;
        if jwt_expiry < Duration::from_secs(300) || jwt_expiry > Duration::from_secs(60 * 60 * 24 * 30) {
            return Err(Error::Internal {
                operation: "validate config: auth.security.jwt_expiry must be between 5 minutes and 30 days".to_string(),
            });
        }

        let cors = &self.auth.security.cors;
        if cors.allowed_origins.is_empty() {
            return Err(Error::Internal {
                operation: "validate config: auth.security.cors.allowed_origins must not be empty".to_string(),
            });
        }
        if cors.allow_credentials && cors.allowed_origins.contains(&CorsOrigin::Wildcard) {
            return Err(Error::Internal {
                operation: "validate config: the wildcard CORS origin cannot be combined with allow_credentials".to_string(),
            });
        }

        if self.storage.cloud_name.trim().is_empty()
            || self.storage.api_key.trim().is_empty()
            || self.storage.api_secret.trim().is_empty()
        {
            return Err(Error::Internal {
                operation: "validate config: storage.cloud_name, storage.api_key and storage.api_secret are required".to_string(),
            });
        }

        if self.uploads.max_file_size == 0 {
            return Err(Error::Internal {
                operation: "validate config: uploads.max_file_size must be greater than zero".to_string(),
            });
        }
        if self.uploads.allowed_types.is_empty() {
            return Err(Error::Internal {
                operation: "validate config: uploads.allowed_types must not be empty".to_string(),
            });
        }

        Ok(())
    }
}
