//! Configuration management for the playout controller
//!
//! Configuration is read from a TOML file, overlaid with `PLAYOUT_*`
//! environment variables and then validated.
//!
//! ```toml
//! [schedule]
//! url = "https://fahrplan.example/schedule.json"
//! refresh_secs = 300
//!
//! [dispatch]
//! auto_schedule = true
//!
//! [workers]
//! "" = "http://playout-default:9000"
//! "Saal 1" = "http://playout-saal1:9000"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::dispatch::{DispatchConfig, Padding};
use crate::poller::poll_interval;

/// Longest padding or lookahead accepted, one week
const MAX_SPAN_SECS: u64 = 7 * 24 * 3600;

/// Invalid or missing configuration values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting '{0}'")]
    Missing(&'static str),

    #[error("invalid value for '{field}': {reason}")]
    Invalid { field: String, reason: String },

    #[error("cannot parse environment variable {var}='{value}'")]
    Env { var: &'static str, value: String },
}

impl ConfigError {
    fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP API settings
    pub server: ServerConfig,

    /// Schedule source settings
    pub schedule: ScheduleConfig,

    /// Dispatch settings
    pub dispatch: DispatchSettings,

    /// Room name to worker base URL; the empty room is the default worker
    pub workers: BTreeMap<String, String>,

    /// Logging configuration
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub enable_cors: bool,
    pub enable_request_logging: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            enable_cors: true,
            enable_request_logging: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Schedule document URL (required)
    pub url: String,

    /// Seconds between schedule fetches
    pub refresh_secs: u64,

    /// `talk_id,studio` rows
    pub talk_studio_file: PathBuf,

    /// `<ignored>,studio,ingest_url` rows
    pub studio_ingest_file: PathBuf,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            refresh_secs: 300,
            talk_studio_file: PathBuf::from("talks.csv"),
            studio_ingest_file: PathBuf::from("studios.csv"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchSettings {
    /// Dispatch upcoming jobs without operator action
    pub auto_schedule: bool,

    /// Lookahead window in seconds
    pub upcoming_window_secs: u64,

    pub pre_padding_secs: u64,
    pub max_post_padding_secs: u64,

    /// Per-request worker timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            auto_schedule: false,
            upcoming_window_secs: 3600,
            pre_padding_secs: 300,
            max_post_padding_secs: 900,
            request_timeout_secs: 5,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

fn env_var(var: &'static str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(var: &'static str) -> std::result::Result<Option<T>, ConfigError> {
    match env_var(var) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Env { var, value }),
        None => Ok(None),
    }
}

impl Config {
    /// Load a file, apply environment overrides and validate
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env()?;
        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Overlay `PLAYOUT_*` environment variables
    pub fn apply_env(&mut self) -> std::result::Result<(), ConfigError> {
        if let Some(v) = env_var("PLAYOUT_BIND_ADDRESS") {
            self.server.bind_address = v;
        }
        if let Some(v) = env_var("PLAYOUT_SCHEDULE_URL") {
            self.schedule.url = v;
        }
        if let Some(v) = parse_env("PLAYOUT_SCHEDULE_REFRESH_SECS")? {
            self.schedule.refresh_secs = v;
        }
        if let Some(v) = parse_env("PLAYOUT_AUTO_SCHEDULE")? {
            self.dispatch.auto_schedule = v;
        }
        if let Some(v) = parse_env("PLAYOUT_UPCOMING_WINDOW_SECS")? {
            self.dispatch.upcoming_window_secs = v;
        }
        if let Some(v) = env_var("PLAYOUT_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = env_var("PLAYOUT_LOG_FORMAT") {
            self.logging.format = v;
        }
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.schedule.url.trim().is_empty() {
            return Err(ConfigError::Missing("schedule.url"));
        }
        Url::parse(&self.schedule.url)
            .map_err(|e| ConfigError::invalid("schedule.url", e.to_string()))?;

        if self.schedule.refresh_secs == 0 {
            return Err(ConfigError::invalid("schedule.refresh_secs", "must be greater than 0"));
        }
        if self.dispatch.upcoming_window_secs == 0 {
            return Err(ConfigError::invalid(
                "dispatch.upcoming_window_secs",
                "must be greater than 0",
            ));
        }
        if self.dispatch.request_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "dispatch.request_timeout_secs",
                "must be greater than 0",
            ));
        }

        for (field, secs) in [
            ("dispatch.upcoming_window_secs", self.dispatch.upcoming_window_secs),
            ("dispatch.pre_padding_secs", self.dispatch.pre_padding_secs),
            ("dispatch.max_post_padding_secs", self.dispatch.max_post_padding_secs),
        ] {
            if secs > MAX_SPAN_SECS {
                return Err(ConfigError::invalid(field, "must not exceed one week"));
            }
        }

        for (room, address) in &self.workers {
            Url::parse(address)
                .map_err(|e| ConfigError::invalid(format!("workers.\"{room}\""), e.to_string()))?;
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            return Err(ConfigError::invalid(
                "logging.format",
                format!("expected 'text' or 'json', got '{}'", self.logging.format),
            ));
        }

        Ok(())
    }

    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.schedule.refresh_secs)
    }

    #[must_use]
    pub fn upcoming_window(&self) -> chrono::Duration {
        span(self.dispatch.upcoming_window_secs)
    }

    /// Tick period of the upcoming poller
    #[must_use]
    pub fn upcoming_poll_interval(&self) -> Duration {
        poll_interval(
            self.refresh_interval(),
            Duration::from_secs(self.dispatch.upcoming_window_secs),
        )
    }

    #[must_use]
    pub fn padding(&self) -> Padding {
        Padding::new(
            span(self.dispatch.pre_padding_secs),
            span(self.dispatch.max_post_padding_secs),
        )
    }

    /// Get worker request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.dispatch.request_timeout_secs)
    }

    #[must_use]
    pub fn dispatch_config(&self) -> DispatchConfig {
        DispatchConfig {
            auto_schedule: self.dispatch.auto_schedule,
            padding: self.padding(),
        }
    }
}

fn span(secs: u64) -> chrono::Duration {
    chrono::Duration::seconds(secs.min(MAX_SPAN_SECS) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Config {
        let mut config = Config::default();
        config.schedule.url = "https://fahrplan.example/schedule.json".to_string();
        config
    }

    #[test]
    fn test_default_config_needs_url() {
        assert_eq!(
            Config::default().validate(),
            Err(ConfigError::Missing("schedule.url"))
        );
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_zero_intervals_rejected() {
        let mut config = valid();
        config.schedule.refresh_secs = 0;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.dispatch.upcoming_window_secs = 0;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.dispatch.request_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_worker_address_rejected() {
        let mut config = valid();
        config
            .workers
            .insert("Saal 1".to_string(), "not a url".to_string());

        match config.validate() {
            Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, "workers.\"Saal 1\""),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_derived_values() {
        let config = valid();
        assert_eq!(config.refresh_interval(), Duration::from_secs(300));
        assert_eq!(config.upcoming_window(), chrono::Duration::hours(1));
        assert_eq!(config.upcoming_poll_interval(), Duration::from_secs(75));
        assert_eq!(config.request_timeout(), Duration::from_secs(5));

        let padding = config.padding();
        assert_eq!(padding.pre, chrono::Duration::minutes(5));
        assert_eq!(padding.max_post, chrono::Duration::minutes(15));
        assert!(!config.dispatch_config().auto_schedule);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [schedule]
            url = "https://fahrplan.example/schedule.json"

            [workers]
            "" = "http://playout:9000"
            "#,
        )
        .unwrap();

        assert_eq!(config.schedule.refresh_secs, 300);
        assert_eq!(config.server.bind_address, "0.0.0.0:8080");
        assert_eq!(config.workers[""], "http://playout:9000");
        assert!(config.validate().is_ok());
    }
}
