use interpret_core::ceu::DEFAULT_SPONSOR_NUMBER;

use crate::auth::jwt::{JwtConfig, DEFAULT_ACCESS_EXPIRY_MINS};

/// A required variable is missing or a value does not parse.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Server configuration loaded from environment variables.
///
/// All fields except the database URL and JWT secret have defaults suitable
/// for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Postgres connection string.
    pub database_url: String,
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Pool acquire and statement timeout in seconds (default: `10`).
    pub db_timeout_secs: u64,
    /// Emails that are always treated as admins, lowercased.
    pub admin_emails: Vec<String>,
    /// Base URL of the public site; verification links hang off it.
    pub public_base_url: String,
    /// RID sponsor number stamped on new certificates.
    pub sponsor_number: String,
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                  | Default                 |
    /// |--------------------------|-------------------------|
    /// | `DATABASE_URL`           | **required**            |
    /// | `HOST`                   | `0.0.0.0`               |
    /// | `PORT`                   | `3000`                  |
    /// | `CORS_ORIGINS`           | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                    |
    /// | `DB_TIMEOUT_SECS`        | `10`                    |
    /// | `ADMIN_EMAILS`           | empty                   |
    /// | `PUBLIC_BASE_URL`        | `http://localhost:5173` |
    /// | `RID_SPONSOR_NUMBER`     | `2309`                  |
    /// | `JWT_SECRET`             | **required**            |
    /// | `JWT_ACCESS_EXPIRY_MINS` | `60`                    |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let required = |name: &'static str| {
            lookup(name)
                .filter(|s| !s.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let database_url = required("DATABASE_URL")?;
        let secret = required("JWT_SECRET")?;

        Ok(Self {
            database_url,
            host: var("HOST", "0.0.0.0"),
            port: parse("PORT", var("PORT", "3000"))?,
            cors_origins: split_list(&var("CORS_ORIGINS", "http://localhost:5173")),
            request_timeout_secs: parse("REQUEST_TIMEOUT_SECS", var("REQUEST_TIMEOUT_SECS", "30"))?,
            db_timeout_secs: parse("DB_TIMEOUT_SECS", var("DB_TIMEOUT_SECS", "10"))?,
            admin_emails: split_list(&var("ADMIN_EMAILS", ""))
                .into_iter()
                .map(|e| e.to_lowercase())
                .collect(),
            public_base_url: var("PUBLIC_BASE_URL", "http://localhost:5173")
                .trim_end_matches('/')
                .to_string(),
            sponsor_number: var("RID_SPONSOR_NUMBER", DEFAULT_SPONSOR_NUMBER),
            jwt: JwtConfig {
                secret,
                access_token_expiry_mins: parse(
                    "JWT_ACCESS_EXPIRY_MINS",
                    var(
                        "JWT_ACCESS_EXPIRY_MINS",
                        DEFAULT_ACCESS_EXPIRY_MINS.to_string().as_str(),
                    ),
                )?,
            },
        })
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
