//! Application configuration
//!
//! Read from a TOML file (`$STAFF_ACCESS_CONFIG`, else
//! `~/.config/staff-access/config.toml`). Every section and key is optional;
//! anything missing falls back to the defaults below.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::identity::IdentityConfig;
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::infrastructure::crypto::password::DEFAULT_COST;
use crate::infrastructure::database::DatabaseConfig;

pub const CONFIG_ENV: &str = "STAFF_ACCESS_CONFIG";

/// Largest real-world UTC offset, in minutes.
const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub access: AccessConfig,
    pub admin: AdminConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub password_min_length: usize,
    /// bcrypt cost for passwords and the panel PIN
    pub hash_cost: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "super-secret-key-change-in-production".to_string(),
            jwt_expiration_hours: 24,
            password_min_length: 6,
            hash_cost: DEFAULT_COST,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    /// The one identity the login-hours window never applies to, and the
    /// only one allowed to change it. Unset means nobody is exempt.
    pub exempt_identity: Option<String>,
    /// Offset of the wall clock the login window is expressed in.
    pub utc_offset_minutes: i32,
    pub require_registration_approval: bool,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            exempt_identity: None,
            utc_offset_minutes: 0,
            require_registration_approval: true,
        }
    }
}

/// Administrator seeded into an empty store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub name: String,
    pub identifier: String,
    pub password: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            name: "Administrator".to_string(),
            identifier: "admin@example.com".to_string(),
            password: "admin123".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.trim().is_empty() {
            return Err(ConfigError::Invalid("security.jwt_secret is empty".into()));
        }
        if self.security.jwt_expiration_hours <= 0 {
            return Err(ConfigError::Invalid(
                "security.jwt_expiration_hours must be positive".into(),
            ));
        }
        if !(4..=31).contains(&self.security.hash_cost) {
            return Err(ConfigError::Invalid(
                "security.hash_cost must be between 4 and 31".into(),
            ));
        }
        if self.access.utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(ConfigError::Invalid(format!(
                "access.utc_offset_minutes must be within ±{}",
                MAX_UTC_OFFSET_MINUTES
            )));
        }
        if let Some(exempt) = &self.access.exempt_identity {
            if exempt.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "access.exempt_identity must not be blank".into(),
                ));
            }
        }
        Ok(())
    }

    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig {
            secret: self.security.jwt_secret.clone(),
            expiration_hours: self.security.jwt_expiration_hours,
            issuer: "staff-access".to_string(),
        }
    }

    pub fn identity_config(&self) -> IdentityConfig {
        IdentityConfig {
            hash_cost: self.security.hash_cost,
            password_min_length: self.security.password_min_length,
            require_registration_approval: self.access.require_registration_approval,
        }
    }
}

/// `$STAFF_ACCESS_CONFIG`, else the per-user config directory.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("staff-access")
        .join("config.toml")
}
