use bcrypt::BcryptError;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

use crate::auth::credentials::UserEntry;

/// HMAC-SHA256 keys shorter than the digest size are refused.
pub const MIN_SECRET_BYTES: usize = 32;

/// bcrypt accepts work factors in this range.
pub const PASSWORD_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

const DEVELOPMENT_SECRET: &str = "development-only-secret-change-me-0123456789";
const DEVELOPMENT_PASSWORD_COST: u32 = 4;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("SECURITY_JWT_SECRET must be set unless APP_ENV=development")]
    MissingSecret,

    #[error("JWT secret must be at least {MIN_SECRET_BYTES} bytes, got {0}")]
    WeakSecret(usize),

    #[error("Invalid SECURITY_USERS entry: {0}")]
    InvalidUsers(String),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("Password hashing failed: {0}")]
    PasswordHash(#[from] BcryptError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_ttl_seconds: u64,
    /// bcrypt work factor for configured passwords
    pub password_cost: u32,
    #[serde(skip_serializing)]
    pub users: Vec<UserEntry>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let app_env = env::var("APP_ENV").ok();
        let config = Self::for_environment(app_env.as_deref())?.with_env_overrides()?;
        config.validate()?;

        if config.uses_development_secret() {
            tracing::warn!("Using the built-in development JWT secret; set SECURITY_JWT_SECRET outside local development");
        }
        Ok(config)
    }

    /// Profile defaults for an `APP_ENV` value. The built-in secret and
    /// account only apply when development is named explicitly; an unset
    /// `APP_ENV` gets development defaults without them.
    pub fn for_environment(app_env: Option<&str>) -> Result<Self, ConfigError> {
        match app_env.map(str::trim) {
            Some("production") | Some("prod") => Ok(Self::production()),
            Some("staging") | Some("stage") => Ok(Self::staging()),
            Some("development") | Some("dev") => Self::development(),
            None | Some("") => {
                let mut config = Self::development()?;
                config.security.jwt_secret = String::new();
                config.security.users = Vec::new();
                Ok(config)
            }
            Some(other) => Err(ConfigError::InvalidValue {
                name: "APP_ENV",
                value: other.to_string(),
            }),
        }
    }

    fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_var("DATABASE_MAX_CONNECTIONS", &v)?;
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = parse_var("DATABASE_CONNECTION_TIMEOUT", &v)?;
        }

        // API overrides
        if let Ok(v) = env::var("API_PORT").or_else(|_| env::var("PORT")) {
            self.api.port = parse_var("PORT", &v)?;
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(v) = env::var("SECURITY_JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_TTL_SECONDS") {
            self.security.jwt_ttl_seconds = parse_var("SECURITY_JWT_TTL_SECONDS", &v)?;
        }
        if let Ok(v) = env::var("SECURITY_PASSWORD_COST") {
            self.security.password_cost = parse_password_cost(&v)?;
        }
        // After the cost override, so these are hashed with it
        if let Ok(v) = env::var("SECURITY_USERS") {
            self.security.users = parse_users(&v, self.security.password_cost)?;
        }

        Ok(self)
    }

    /// Rejects configurations the server must not start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let secret_len = self.security.jwt_secret.len();
        if secret_len == 0 {
            return Err(ConfigError::MissingSecret);
        }
        if secret_len < MIN_SECRET_BYTES {
            return Err(ConfigError::WeakSecret(secret_len));
        }
        if self.security.jwt_ttl_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                name: "SECURITY_JWT_TTL_SECONDS",
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    pub fn development() -> Result<Self, ConfigError> {
        Ok(Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_connections: 5,
                connection_timeout: 30,
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: true,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                jwt_secret: DEVELOPMENT_SECRET.to_string(),
                jwt_ttl_seconds: 3600,
                password_cost: DEVELOPMENT_PASSWORD_COST,
                users: vec![UserEntry::new(
                    "user",
                    "password",
                    vec!["USER".to_string()],
                    DEVELOPMENT_PASSWORD_COST,
                )?],
            },
        })
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: "postgres://localhost:5432/tasks".to_string(),
                max_connections: 20,
                connection_timeout: 10,
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: true,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                jwt_secret: String::new(),
                jwt_ttl_seconds: 3600,
                password_cost: bcrypt::DEFAULT_COST,
                users: Vec::new(),
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: "postgres://localhost:5432/tasks".to_string(),
                max_connections: 50,
                connection_timeout: 5,
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: false,
            },
            security: SecurityConfig {
                enable_cors: false,
                cors_origins: Vec::new(),
                jwt_secret: String::new(),
                jwt_ttl_seconds: 3600,
                password_cost: bcrypt::DEFAULT_COST,
                users: Vec::new(),
            },
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn uses_development_secret(&self) -> bool {
        self.security.jwt_secret == DEVELOPMENT_SECRET
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name,
        value: value.to_string(),
    })
}

fn parse_password_cost(value: &str) -> Result<u32, ConfigError> {
    let cost: u32 = parse_var("SECURITY_PASSWORD_COST", value)?;
    if !PASSWORD_COST_RANGE.contains(&cost) {
        return Err(ConfigError::InvalidValue {
            name: "SECURITY_PASSWORD_COST",
            value: value.to_string(),
        });
    }
    Ok(cost)
}

/// Parses `name:password:ROLE1,ROLE2;name2:password2:ROLE`.
///
/// The name ends at the first `:` and the roles start after the last one,
/// so passwords may contain `:` but not `;`.
pub fn parse_users(raw: &str, cost: u32) -> Result<Vec<UserEntry>, ConfigError> {
    raw.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let Some((name, rest)) = entry.split_once(':') else {
                return Err(ConfigError::InvalidUsers(entry.to_string()));
            };
            let Some((password, roles)) = rest.rsplit_once(':') else {
                return Err(ConfigError::InvalidUsers(entry.to_string()));
            };
            if name.trim().is_empty() || password.is_empty() {
                return Err(ConfigError::InvalidUsers(entry.to_string()));
            }
            let roles = roles
                .split(',')
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .collect();
            Ok(UserEntry::new(name.trim(), password, roles, cost)?)
        })
        .collect()
}
