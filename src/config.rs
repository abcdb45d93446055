//! Runtime configuration
//!
//! Endpoints, the nutrition API key and the data directory come from the
//! environment, falling back to built-in defaults.

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, warn};

use crate::api::auth::DEFAULT_AUTH_URL;
use crate::api::nutrition::DEFAULT_NUTRITION_URL;
use crate::store::FileStore;

/// Number of ingredient results fetched per search by default
pub const DEFAULT_SEARCH_LIMIT: u32 = 3;

/// Upper bound on ingredient results per search
const MAX_SEARCH_LIMIT: u32 = 20;

/// Errors that can occur when building the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable holds an unusable value
    #[error("Invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    /// No data directory was configured and none could be determined
    #[error("Could not determine a data directory; set MEALDAY_DATA_DIR or pass --data-dir")]
    NoDataDir,
}

/// Settings for the remote services and local persistence
#[derive(Debug, Clone)]
pub struct Config {
    pub auth_url: String,
    pub nutrition_url: String,
    pub api_key: String,
    /// Explicit data directory; `None` uses the platform default
    pub data_dir: Option<PathBuf>,
    pub search_limit: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auth_url: DEFAULT_AUTH_URL.to_string(),
            nutrition_url: DEFAULT_NUTRITION_URL.to_string(),
            api_key: String::new(),
            data_dir: None,
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

impl Config {
    /// Reads the configuration from process environment variables
    ///
    /// * `MEALDAY_AUTH_URL` - auth service base URL
    /// * `MEALDAY_NUTRITION_URL` - nutrition API base URL
    /// * `SPOONACULAR_API_KEY` - nutrition API key
    /// * `MEALDAY_DATA_DIR` - directory for the session token and cached results
    /// * `MEALDAY_SEARCH_LIMIT` - ingredient results per search (1-20)
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Config::default();

        let api_key = var("SPOONACULAR_API_KEY").unwrap_or_else(|| {
            warn!("SPOONACULAR_API_KEY not set, nutrition requests will be rejected");
            String::new()
        });

        let search_limit = match var("MEALDAY_SEARCH_LIMIT") {
            Some(raw) => {
                let limit: u32 = parse_value("MEALDAY_SEARCH_LIMIT", &raw)?;
                if !(1..=MAX_SEARCH_LIMIT).contains(&limit) {
                    return Err(ConfigError::InvalidValue {
                        key: "MEALDAY_SEARCH_LIMIT",
                        value: raw,
                        reason: format!("must be between 1 and {}", MAX_SEARCH_LIMIT),
                    });
                }
                limit
            }
            None => defaults.search_limit,
        };

        Ok(Self {
            auth_url: with_default(var("MEALDAY_AUTH_URL"), "MEALDAY_AUTH_URL", defaults.auth_url),
            nutrition_url: with_default(
                var("MEALDAY_NUTRITION_URL"),
                "MEALDAY_NUTRITION_URL",
                defaults.nutrition_url,
            ),
            api_key,
            data_dir: var("MEALDAY_DATA_DIR").map(PathBuf::from),
            search_limit,
        })
    }

    /// Overrides the data directory
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Directory persisted state is kept in
    pub fn resolve_data_dir(&self) -> Result<PathBuf, ConfigError> {
        self.data_dir
            .clone()
            .or_else(FileStore::default_dir)
            .ok_or(ConfigError::NoDataDir)
    }
}

fn with_default(value: Option<String>, key: &str, default: String) -> String {
    value.unwrap_or_else(|| {
        debug!("{key} not set, using default: {default}");
        default
    })
}

fn parse_value<T: FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}
