use std::env;
use std::str::FromStr;

/// Upper bound on token lifetime: one hundred years.
pub const MAX_JWT_EXPIRATION_HOURS: i64 = 24 * 365 * 100;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub server_port: u16,
    pub server_host: String,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::Missing(key));

        let config = Self {
            database_url: required("DATABASE_URL")?,
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?,
            server_port: parse_or(&lookup, "SERVER_PORT", 8080)?,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            jwt_secret: required("JWT_SECRET")?,
            jwt_expiration_hours: parse_or(&lookup, "JWT_EXPIRATION_HOURS", 24)?,
            bcrypt_cost: parse_or(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?,
        };

        if !(4..=31).contains(&config.bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                value: config.bcrypt_cost.to_string(),
            });
        }
        if !(1..=MAX_JWT_EXPIRATION_HOURS).contains(&config.jwt_expiration_hours) {
            return Err(ConfigError::Invalid {
                key: "JWT_EXPIRATION_HOURS",
                value: config.jwt_expiration_hours.to_string(),
            });
        }
        Ok(config)
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}
