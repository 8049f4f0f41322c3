use std::{env, path::PathBuf, str::FromStr};

use thiserror::Error;
use tracing::info;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub index_limit: usize,
    pub allow_empty_index: bool,
    pub fixture: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3030,
            database_url: None,
            database_max_connections: 5,
            index_limit: 5,
            allow_empty_index: true,
            fixture: None,
        }
    }
}

impl Config {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            port: try_load(&lookup, "PORT", defaults.port)?,
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            database_max_connections: try_load(
                &lookup,
                "DATABASE_MAX_CONNECTIONS",
                defaults.database_max_connections,
            )?,
            index_limit: try_load(&lookup, "POLLS_INDEX_LIMIT", defaults.index_limit)?,
            allow_empty_index: try_load(&lookup, "POLLS_ALLOW_EMPTY_INDEX", defaults.allow_empty_index)?,
            fixture: lookup("POLLS_FIXTURE").map(PathBuf::from),
        })
    }
}

fn try_load<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => {
            info!("{key} not set, using default");
            Ok(default)
        }
    }
}
