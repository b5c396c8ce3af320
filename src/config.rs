// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment once at startup (after
//! `dotenvy` has loaded any `.env` file) and is immutable afterwards.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `JWT_SECRET` | Token signing secret | **Required** |
//! | `DATA_DIR` | Root directory for the document store | `./data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8000` |
//! | `APP_ENV` | `production` hides internal error detail | `development` |
//! | `TOKEN_TTL_HOURS` | Bearer token lifetime | `24` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::path::PathBuf;

use chrono::Duration;
use thiserror::Error;

pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const APP_ENV_ENV: &str = "APP_ENV";
pub const TOKEN_TTL_HOURS_ENV: &str = "TOKEN_TTL_HOURS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Startup-fatal configuration problems.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT_SECRET is not set; refusing to start without a token signing secret")]
    MissingJwtSecret,
    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Deployment environment. Only affects how much error detail reaches clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppEnvironment {
    #[default]
    Development,
    Production,
}

impl AppEnvironment {
    fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "production" | "prod" => AppEnvironment::Production,
            _ => AppEnvironment::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        *self == AppEnvironment::Production
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Token signing configuration, injected into `TokenService`.
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl: Duration,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

/// Complete server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub environment: AppEnvironment,
    pub log_format: LogFormat,
    pub auth: AuthConfig,
}

impl ServerConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let jwt_secret = lookup(JWT_SECRET_ENV)
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::MissingJwtSecret)?;

        let port = match lookup(PORT_ENV) {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                name: PORT_ENV,
                value,
            })?,
            None => DEFAULT_PORT,
        };

        let ttl_hours = match lookup(TOKEN_TTL_HOURS_ENV) {
            Some(value) => match value.parse::<i64>() {
                Ok(hours) if hours > 0 => hours,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: TOKEN_TTL_HOURS_ENV,
                        value,
                    })
                }
            },
            None => DEFAULT_TOKEN_TTL_HOURS,
        };

        Ok(Self {
            host: lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            data_dir: lookup(DATA_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(crate::storage::paths::DATA_ROOT)),
            environment: lookup(APP_ENV_ENV)
                .map(|v| AppEnvironment::parse(&v))
                .unwrap_or_default(),
            log_format: lookup(LOG_FORMAT_ENV)
                .map(|v| LogFormat::parse(&v))
                .unwrap_or_default(),
            auth: AuthConfig {
                jwt_secret,
                token_ttl: Duration::hours(ttl_hours),
            },
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
