use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use crate::application::events::DEFAULT_MAILBOX_CAPACITY;
use crate::infrastructure::database::DEFAULT_ACTIVITY_RETENTION;

pub const HTTP_ADDR_KEY: &str = "TASKBOARD_HTTP_ADDR";
pub const MAILBOX_CAPACITY_KEY: &str = "TASKBOARD_MAILBOX_CAPACITY";
pub const MONITOR_INTERVAL_KEY: &str = "TASKBOARD_MONITOR_INTERVAL_SECS";
pub const LOG_FORMAT_KEY: &str = "TASKBOARD_LOG_FORMAT";
pub const ACTIVITY_RETENTION_KEY: &str = "TASKBOARD_ACTIVITY_RETENTION";

const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MONITOR_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key}={value:?} is invalid: expected {expected}")]
    Invalid {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Service configuration, read from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub http_addr: SocketAddr,
    pub mailbox_capacity: usize,
    /// `None` disables the bus monitor
    pub monitor_interval: Option<Duration>,
    pub log_format: LogFormat,
    /// Activity entries kept per board by the in-memory store
    pub activity_retention: usize,
}

impl AppConfig {
    /// Load from process environment (and `.env` when present)
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load through an arbitrary key lookup. Unset and empty values take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let http_addr = match get(HTTP_ADDR_KEY) {
            Some(value) => parse_addr(&value).ok_or(ConfigError::Invalid {
                key: HTTP_ADDR_KEY,
                value,
                expected: "host:port or :port",
            })?,
            None => parse_addr(DEFAULT_HTTP_ADDR).ok_or(ConfigError::Invalid {
                key: HTTP_ADDR_KEY,
                value: DEFAULT_HTTP_ADDR.to_string(),
                expected: "host:port or :port",
            })?,
        };

        let mailbox_capacity =
            positive(MAILBOX_CAPACITY_KEY, get(MAILBOX_CAPACITY_KEY), DEFAULT_MAILBOX_CAPACITY)?;
        let activity_retention = positive(
            ACTIVITY_RETENTION_KEY,
            get(ACTIVITY_RETENTION_KEY),
            DEFAULT_ACTIVITY_RETENTION,
        )?;

        let monitor_secs = match get(MONITOR_INTERVAL_KEY) {
            Some(value) => value.parse::<u64>().map_err(|_| ConfigError::Invalid {
                key: MONITOR_INTERVAL_KEY,
                value,
                expected: "a number of seconds (0 disables)",
            })?,
            None => DEFAULT_MONITOR_INTERVAL_SECS,
        };

        let log_format = get(LOG_FORMAT_KEY).map(|v| v.to_ascii_lowercase());
        let log_format = match log_format.as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: LOG_FORMAT_KEY,
                    value: other.to_string(),
                    expected: "pretty or json",
                })
            }
        };

        Ok(Self {
            http_addr,
            mailbox_capacity,
            monitor_interval: (monitor_secs > 0).then(|| Duration::from_secs(monitor_secs)),
            log_format,
            activity_retention,
        })
    }
}

fn positive(
    key: &'static str,
    value: Option<String>,
    default: usize,
) -> Result<usize, ConfigError> {
    match value {
        Some(value) => match value.parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(ConfigError::Invalid {
                key,
                value,
                expected: "a positive integer",
            }),
        },
        None => Ok(default),
    }
}

/// Accepts `host:port` and the `:port` shorthand (all interfaces)
fn parse_addr(value: &str) -> Option<SocketAddr> {
    if let Some(port) = value.strip_prefix(':') {
        return format!("0.0.0.0:{}", port).parse().ok();
    }
    value.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();

        assert_eq!(config.http_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.mailbox_capacity, 64);
        assert_eq!(config.monitor_interval, Some(Duration::from_secs(60)));
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.activity_retention, 500);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            (HTTP_ADDR_KEY, "127.0.0.1:9000"),
            (MAILBOX_CAPACITY_KEY, "128"),
            (MONITOR_INTERVAL_KEY, "0"),
            (LOG_FORMAT_KEY, "JSON"),
            (ACTIVITY_RETENTION_KEY, "20"),
        ])
        .unwrap();

        assert_eq!(config.http_addr, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.mailbox_capacity, 128);
        assert_eq!(config.monitor_interval, None);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.activity_retention, 20);
    }

    #[test]
    fn test_port_shorthand() {
        let config = load(&[(HTTP_ADDR_KEY, ":3000")]).unwrap();
        assert_eq!(config.http_addr, "0.0.0.0:3000".parse().unwrap());
    }

    #[test]
    fn test_empty_value_falls_back_to_default() {
        let config = load(&[(MAILBOX_CAPACITY_KEY, "  ")]).unwrap();
        assert_eq!(config.mailbox_capacity, 64);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = load(&[(MAILBOX_CAPACITY_KEY, "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: MAILBOX_CAPACITY_KEY, .. }));
        let err = load(&[(ACTIVITY_RETENTION_KEY, "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: ACTIVITY_RETENTION_KEY, .. }));
    }

    #[test]
    fn test_bad_values_rejected() {
        assert!(load(&[(HTTP_ADDR_KEY, "not-an-addr")]).is_err());
        assert!(load(&[(MONITOR_INTERVAL_KEY, "soon")]).is_err());
        let err = load(&[(LOG_FORMAT_KEY, "xml")]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "TASKBOARD_LOG_FORMAT=\"xml\" is invalid: expected pretty or json"
        );
    }
}
