//! Configuration for the todo store.
//!
//! Loaded from environment variables with defaults matching the public
//! placeholder API:
//!
//! | Variable | Default |
//! |----------|---------|
//! | `POCKET_TODO_SEED_URL` | `https://jsonplaceholder.typicode.com/todos` |
//! | `POCKET_TODO_SEED_LIMIT` | `20` |
//! | `POCKET_TODO_DEFAULT_OWNER` | `1` |
//! | `POCKET_TODO_HTTP_TIMEOUT_SECS` | unset (transport default) |
//!
//! A `.env` file in the working directory is honoured by [`Config::load`].

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Seed endpoint used when none is configured
pub const DEFAULT_SEED_URL: &str = "https://jsonplaceholder.typicode.com/todos";

/// Number of remote records kept from a fetch
pub const DEFAULT_SEED_LIMIT: usize = 20;

/// Owner assigned to locally created todos
pub const DEFAULT_OWNER: u64 = 1;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Where seed todos are fetched from
    pub seed_url: String,
    /// How many remote records to keep
    pub seed_limit: usize,
    /// Owner for todos created locally
    pub default_owner: u64,
    /// Request timeout; `None` leaves it to the HTTP client
    pub http_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed_url: DEFAULT_SEED_URL.to_string(),
            seed_limit: DEFAULT_SEED_LIMIT,
            default_owner: DEFAULT_OWNER,
            http_timeout: None,
        }
    }
}

impl Config {
    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to an unparseable value or
    /// the result fails [`Config::validate`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load `.env` if present, then read the process environment
    ///
    /// Variables already set in the environment win over the file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::File`] if a `.env` file exists but cannot be
    /// parsed, otherwise the same errors as [`Config::from_env`].
    pub fn load() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "Loaded env file"),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(ConfigError::File(e.to_string())),
        }
        Self::from_env()
    }

    /// Load configuration from a `.env`-style file only
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::File`] if the file cannot be read or parsed,
    /// otherwise the same errors as [`Config::from_env`].
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let vars = dotenvy::from_path_iter(path.as_ref())
            .map_err(|e| ConfigError::File(e.to_string()))?
            .collect::<Result<HashMap<String, String>, _>>()
            .map_err(|e| ConfigError::File(e.to_string()))?;

        Self::from_lookup(|var| vars.get(var).cloned())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            seed_url: lookup("POCKET_TODO_SEED_URL").unwrap_or(defaults.seed_url),
            seed_limit: parse_var(&lookup, "POCKET_TODO_SEED_LIMIT")?.unwrap_or(defaults.seed_limit),
            default_owner: parse_var(&lookup, "POCKET_TODO_DEFAULT_OWNER")?
                .unwrap_or(defaults.default_owner),
            http_timeout: parse_var::<u64, _>(&lookup, "POCKET_TODO_HTTP_TIMEOUT_SECS")?
                .map(Duration::from_secs),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check that the values are usable
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for a non-HTTP seed URL, a zero seed
    /// limit, or a zero timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.seed_url.starts_with("http://") && !self.seed_url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "seed URL must start with http:// or https://, got `{}`",
                self.seed_url
            )));
        }

        if self.seed_limit == 0 {
            return Err(ConfigError::Validation("seed limit must be at least 1".to_string()));
        }

        if self.http_timeout == Some(Duration::ZERO) {
            return Err(ConfigError::Validation("HTTP timeout must be positive".to_string()));
        }

        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .map(|value| {
            value.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
                var,
                value: value.clone(),
                reason: e.to_string(),
            })
        })
        .transpose()
}
