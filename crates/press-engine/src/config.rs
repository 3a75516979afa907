//! Service Configuration
//!
//! Defaults, overridden by environment variables; the server binary layers
//! its command-line flags on top.

use std::path::PathBuf;
use std::time::Duration;

use press_css::PageGeometry;

/// Render service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Worker threads rendering jobs
    pub workers: usize,

    /// Jobs allowed to wait for a worker
    pub queue_depth: usize,

    /// Wall-clock limit for one job
    pub job_timeout: Duration,

    /// Limit for fetching one remote image
    pub fetch_timeout: Duration,

    /// Directory relative image paths are read from
    pub asset_dir: Option<PathBuf>,

    /// Allow `http(s)` image URLs
    pub allow_remote: bool,

    /// HTTP listen port
    pub port: u16,

    /// Page used when neither the request nor `@page` sets one
    pub page: PageGeometry,

    /// Flate-compress content streams
    pub compress: bool,

    /// User agent for remote fetches
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        let workers = num_cpus::get().max(1);
        Self {
            workers,
            queue_depth: workers * 4,
            job_timeout: Duration::from_secs(30),
            fetch_timeout: Duration::from_secs(10),
            asset_dir: None,
            allow_remote: true,
            port: 8080,
            page: PageGeometry::a4(),
            compress: true,
            user_agent: format!("Press/{}", crate::VERSION),
        }
    }
}

/// Invalid configuration value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{name}={value:?} is not a valid {expected}")]
    InvalidValue {
        name: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

impl Config {
    /// Defaults overridden by `PRESS_*` and `PORT` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`Config::from_env`], reading variables through `lookup`
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let var = |name: &'static str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(value) = var("PRESS_WORKERS") {
            config.workers = parse_number(&value, "PRESS_WORKERS")?;
            config.queue_depth = config.workers * 4;
        }
        if let Some(value) = var("PRESS_QUEUE_DEPTH") {
            config.queue_depth = parse_number(&value, "PRESS_QUEUE_DEPTH")?;
        }
        if let Some(value) = var("PRESS_JOB_TIMEOUT_MS") {
            config.job_timeout = Duration::from_millis(parse_number(&value, "PRESS_JOB_TIMEOUT_MS")?);
        }
        if let Some(value) = var("PRESS_FETCH_TIMEOUT_MS") {
            config.fetch_timeout = Duration::from_millis(parse_number(&value, "PRESS_FETCH_TIMEOUT_MS")?);
        }
        if let Some(value) = var("PRESS_ASSET_DIR") {
            config.asset_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = var("PRESS_ALLOW_REMOTE") {
            config.allow_remote = match value.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "PRESS_ALLOW_REMOTE",
                        value,
                        expected: "boolean",
                    });
                }
            };
        }
        if let Some(value) = var("PORT") {
            config.port = parse_number(&value, "PORT")?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the service cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::Zero("workers"));
        }
        if self.job_timeout.is_zero() {
            return Err(ConfigError::Zero("job timeout"));
        }
        if self.fetch_timeout.is_zero() {
            return Err(ConfigError::Zero("fetch timeout"));
        }
        Ok(())
    }

    /// Jobs that may be queued or running at once
    pub fn capacity(&self) -> usize {
        self.workers + self.queue_depth
    }
}

fn parse_number<T: std::str::FromStr>(value: &str, name: &'static str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        name,
        value: value.to_string(),
        expected: "number",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.workers >= 1);
        assert_eq!(config.queue_depth, config.workers * 4);
        assert_eq!(config.capacity(), config.workers * 5);
        assert!(config.compress);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_environment_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("PRESS_WORKERS", "3"),
            ("PRESS_QUEUE_DEPTH", "2"),
            ("PRESS_JOB_TIMEOUT_MS", "1500"),
            ("PRESS_FETCH_TIMEOUT_MS", "250"),
            ("PRESS_ASSET_DIR", "/srv/assets"),
            ("PRESS_ALLOW_REMOTE", "off"),
            ("PORT", "9000"),
        ]))
        .unwrap();
        assert_eq!(config.workers, 3);
        assert_eq!(config.queue_depth, 2);
        assert_eq!(config.job_timeout, Duration::from_millis(1500));
        assert_eq!(config.fetch_timeout, Duration::from_millis(250));
        assert_eq!(config.asset_dir, Some(PathBuf::from("/srv/assets")));
        assert!(!config.allow_remote);
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn test_workers_scale_default_queue() {
        let config = Config::from_lookup(lookup(&[("PRESS_WORKERS", "2")])).unwrap();
        assert_eq!(config.queue_depth, 8);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = Config::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: "PORT", .. }));

        let err = Config::from_lookup(lookup(&[("PRESS_WORKERS", "0")])).unwrap_err();
        assert_eq!(err, ConfigError::Zero("workers"));
    }

    #[test]
    fn test_blank_values_ignored() {
        let config = Config::from_lookup(lookup(&[("PORT", "  ")])).unwrap();
        assert_eq!(config.port, Config::default().port);
    }
}
