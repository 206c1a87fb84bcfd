//! Report configuration: TOML file plus environment overrides.
//!
//! Every field has a default, so an empty file (or no file at all) is a
//! valid configuration:
//!
//! ```toml
//! [polygon]
//! base_url = "https://api.polygon.io"
//! timeout_secs = 10
//! rate_limit_retry_delay_ms = 1000
//! requests_per_minute = 5        # optional client-side throttle
//!
//! [report]
//! history_days = 365
//! ladder_size = 5
//! near_term_days = 30
//! ```
//!
//! The API key is never read from the file; it comes from `POLYGON_API_KEY`.

use std::{
    num::NonZeroU32,
    path::{Path, PathBuf},
    time::Duration,
};

use market_data::providers::polygon_rest::PolygonConfig;
use serde::{Deserialize, Serialize};
use shared_utils::env::{InvalidEnvVarError, get_env_parsed, get_env_var_opt};
use thiserror::Error;
use tracing::debug;
use wheel_engine::ladder::{DEFAULT_LADDER_SIZE, NEAR_TERM_DAYS};

/// Environment variable naming a config file when `--config` is not given.
pub const CONFIG_PATH_ENV: &str = "WHEEL_REPORT_CONFIG";
/// Overrides `[polygon].base_url`.
pub const BASE_URL_ENV: &str = "POLYGON_BASE_URL";
/// Overrides `[polygon].requests_per_minute`.
pub const REQUESTS_PER_MINUTE_ENV: &str = "POLYGON_REQUESTS_PER_MINUTE";

/// Calendar days of daily history fetched for a report.
pub const DEFAULT_HISTORY_DAYS: u32 = 365;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error(transparent)]
    Env(#[from] InvalidEnvVarError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub polygon: PolygonSection,
    pub report: ReportSection,
}

/// `[polygon]`: connection settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolygonSection {
    pub base_url: String,
    pub timeout_secs: u64,
    pub rate_limit_retry_delay_ms: u64,
    /// Client-side throttle; absent means unthrottled.
    pub requests_per_minute: Option<u32>,
}

impl Default for PolygonSection {
    fn default() -> Self {
        let defaults = PolygonConfig::default();
        Self {
            base_url: defaults.base_url,
            timeout_secs: defaults.timeout.as_secs(),
            rate_limit_retry_delay_ms: defaults.retry_delay.as_millis() as u64,
            requests_per_minute: None,
        }
    }
}

impl PolygonSection {
    /// Converts the section into provider settings.
    pub fn to_provider_config(&self) -> Result<PolygonConfig, ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "polygon.timeout_secs must be at least 1".into(),
            ));
        }
        let requests_per_minute = match self.requests_per_minute {
            None => None,
            Some(rpm) => Some(NonZeroU32::new(rpm).ok_or_else(|| {
                ConfigError::Invalid("polygon.requests_per_minute must be at least 1".into())
            })?),
        };
        Ok(PolygonConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            retry_delay: Duration::from_millis(self.rate_limit_retry_delay_ms),
            requests_per_minute,
        })
    }
}

/// `[report]`: what a report shows.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportSection {
    pub history_days: u32,
    pub ladder_size: usize,
    pub near_term_days: u64,
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            history_days: DEFAULT_HISTORY_DAYS,
            ladder_size: DEFAULT_LADDER_SIZE,
            near_term_days: NEAR_TERM_DAYS,
        }
    }
}

/// Parses a TOML string and applies environment overrides.
pub fn load_config_str(s: &str, origin: &Path) -> Result<AppConfig, ConfigError> {
    let mut cfg: AppConfig = toml::from_str(s).map_err(|source| ConfigError::Parse {
        path: origin.to_path_buf(),
        source,
    })?;
    apply_env_overrides(&mut cfg)?;
    Ok(cfg)
}

/// Loads the configuration.
///
/// Uses `path` when given, else the file named by `WHEEL_REPORT_CONFIG`,
/// else the defaults. Environment overrides apply in every case.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let path = path
        .map(Path::to_path_buf)
        .or_else(|| get_env_var_opt(CONFIG_PATH_ENV).map(PathBuf::from));

    let Some(path) = path else {
        debug!("no config file, using defaults");
        let mut cfg = AppConfig::default();
        apply_env_overrides(&mut cfg)?;
        return Ok(cfg);
    };

    let s = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    debug!(path = %path.display(), "config loaded");
    load_config_str(&s, &path)
}

fn apply_env_overrides(cfg: &mut AppConfig) -> Result<(), ConfigError> {
    if let Some(url) = get_env_var_opt(BASE_URL_ENV) {
        cfg.polygon.base_url = url;
    }
    if let Some(rpm) = get_env_parsed::<u32>(REQUESTS_PER_MINUTE_ENV)? {
        cfg.polygon.requests_per_minute = Some(rpm);
    }
    Ok(())
}
