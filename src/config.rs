use std::fmt;

use anyhow::Context;
use sqlx::postgres::PgSslMode;

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:9002";
// one year
const MAX_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Clone)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub ssl_mode: PgSslMode,
    pub max_connections: u32,
}

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub db: DbConfig,
    pub jwt: JwtConfig,
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .field("ssl_mode", &self.ssl_mode)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("ttl_minutes", &self.ttl_minutes)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup. Missing database credentials or
    /// signing secret are errors, as is a token lifetime outside one minute to
    /// one year; everything else has a default.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            get(key).with_context(|| format!("{key} environment variable is required"))
        };

        let db = DbConfig {
            host: get("DB_HOST").unwrap_or_else(|| "localhost".into()),
            port: get("DB_PORT")
                .unwrap_or_else(|| "5432".into())
                .parse()
                .context("DB_PORT must be a port number")?,
            user: required("DB_USER")?,
            password: required("DB_PASSWORD")?,
            name: required("DB_NAME")?,
            ssl_mode: get("DB_SSLMODE")
                .unwrap_or_else(|| "disable".into())
                .parse()
                .context("DB_SSLMODE is not a valid sslmode")?,
            max_connections: get("DB_MAX_CONNECTIONS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
        };

        let jwt = JwtConfig {
            secret: required("JWT_SECRET")?,
            ttl_minutes: match get("JWT_TTL_MINUTES") {
                None => 60 * 24,
                Some(v) => v
                    .parse::<i64>()
                    .ok()
                    .filter(|m| (1..=MAX_TTL_MINUTES).contains(m))
                    .with_context(|| {
                        format!("JWT_TTL_MINUTES must be between 1 and {MAX_TTL_MINUTES}")
                    })?,
            },
        };

        let cors_origins = get("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.into())
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(String::from)
            .collect();

        Ok(Self {
            host: get("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: get("APP_PORT")
                .unwrap_or_else(|| "8080".into())
                .parse()
                .context("APP_PORT must be a port number")?,
            cors_origins,
            db,
            jwt,
        })
    }
}
