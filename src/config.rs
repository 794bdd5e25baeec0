use std::collections::HashMap;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;

/// Default token lifetime in hours.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 6;

/// Process configuration, built once at startup and handed to the pool
/// builder, the token service and the HTTP server.
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub listen_address: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub db_statement_timeout: Duration,
    pub cors_allowed_origin: Option<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("listen_address", &self.listen_address)
            .field("token_ttl_hours", &self.token_ttl_hours)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_acquire_timeout", &self.db_acquire_timeout)
            .field("db_statement_timeout", &self.db_statement_timeout)
            .field("cors_allowed_origin", &self.cors_allowed_origin)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds the configuration from a map, mostly useful in tests.
    pub fn from_map(vars: &HashMap<&str, &str>) -> Result<Self, AppError> {
        Self::from_vars(|key| vars.get(key).map(|v| v.to_string()))
    }

    pub fn from_vars<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| AppError::Config("JWT_SECRET must be set and non-empty".into()))?;

        let database_url = match lookup("DATABASE_URL") {
            Some(url) => url,
            None => database_url_from_parts(&lookup)?,
        };

        let listen_address = match lookup("LISTEN_ADDRESS") {
            Some(addr) => addr,
            None => {
                let host = lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
                let port: u16 = parse_or(&lookup, "SERVER_PORT", 8080)?;
                format!("{}:{}", host, port)
            }
        };

        let token_ttl_hours: i64 = parse_or(&lookup, "JWT_TTL_HOURS", DEFAULT_TOKEN_TTL_HOURS)?;
        if token_ttl_hours <= 0 {
            return Err(AppError::Config("JWT_TTL_HOURS must be positive".into()));
        }

        Ok(Self {
            database_url,
            listen_address,
            jwt_secret,
            token_ttl_hours,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 5)?,
            db_acquire_timeout: Duration::from_secs(parse_or(&lookup, "DB_ACQUIRE_TIMEOUT_SECS", 5)?),
            db_statement_timeout: Duration::from_secs(parse_or(
                &lookup,
                "DB_STATEMENT_TIMEOUT_SECS",
                30,
            )?),
            cors_allowed_origin: lookup("CORS_ALLOWED_ORIGIN").filter(|o| !o.is_empty()),
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}", self.listen_address)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid {}: {}", key, e))),
        None => Ok(default),
    }
}

/// Assembles a Postgres URL from the `PSQL_*` variables. User name,
/// password and database are percent-encoded.
fn database_url_from_parts<F>(lookup: &F) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let required = |key: &str| {
        lookup(key).ok_or_else(|| {
            AppError::Config(format!("either DATABASE_URL or {} must be set", key))
        })
    };

    let host = required("PSQL_HOST")?;
    let user = required("PSQL_USERNAME")?;
    let database = required("PSQL_DATABASE")?;
    let password = lookup("PSQL_PASSWORD").unwrap_or_default();
    let port: u16 = parse_or(lookup, "PSQL_PORT", 5432)?;
    let ssl_mode = lookup("PSQL_SSL").unwrap_or_else(|| "prefer".to_string());

    let credentials = if password.is_empty() {
        urlencoding::encode(&user).into_owned()
    } else {
        format!(
            "{}:{}",
            urlencoding::encode(&user),
            urlencoding::encode(&password)
        )
    };

    Ok(format!(
        "postgres://{}@{}:{}/{}?sslmode={}",
        credentials,
        host,
        port,
        urlencoding::encode(&database),
        urlencoding::encode(&ssl_mode)
    ))
}
