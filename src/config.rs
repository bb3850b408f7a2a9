use std::path::PathBuf;
use std::time::Duration;

use crate::db::migrations;
use crate::error::{AppError, AppResult};

pub const API_BASE_ENV: &str = "SHIELDMATE_API_BASE_URL";
pub const DATA_DIR_ENV: &str = "SHIELDMATE_DATA_DIR";
pub const TIMEOUT_ENV: &str = "SHIELDMATE_TIMEOUT_SECS";

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub data_dir: PathBuf,
    pub request_timeout: Duration,
}

/// Values given explicitly on the command line. They win over the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_base_url: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            data_dir: migrations::get_base_dir(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl AppConfig {
    pub fn from_env(overrides: ConfigOverrides) -> AppResult<Self> {
        Self::resolve(overrides, |key| std::env::var(key).ok())
    }

    /// Layer overrides, then `lookup` (the environment), then defaults.
    pub fn resolve<F>(overrides: ConfigOverrides, lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_base_url = overrides
            .api_base_url
            .or_else(|| non_empty(API_BASE_ENV))
            .unwrap_or(defaults.api_base_url);
        let api_base_url = api_base_url.trim().trim_end_matches('/').to_string();
        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(AppError::Config(format!(
                "API base URL must start with http:// or https://, got '{api_base_url}'"
            )));
        }

        let data_dir = overrides
            .data_dir
            .or_else(|| non_empty(DATA_DIR_ENV).map(PathBuf::from))
            .unwrap_or(defaults.data_dir);

        let timeout_secs = match overrides.timeout_secs {
            Some(secs) => secs,
            None => match non_empty(TIMEOUT_ENV) {
                Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
                    AppError::Config(format!("{TIMEOUT_ENV} must be a number of seconds: {e}"))
                })?,
                None => DEFAULT_TIMEOUT_SECS,
            },
        };
        if timeout_secs == 0 {
            return Err(AppError::Config("Request timeout must be at least one second".into()));
        }

        Ok(Self {
            api_base_url,
            data_dir,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
