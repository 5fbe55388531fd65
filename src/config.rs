use crate::error::ConfigError;
use std::time::Duration;

const DEFAULT_SOURCE: &str = "campaign_data.csv";
const DEFAULT_SHEET_GID: &str = "0";
const DEFAULT_REFRESH_SECS: u64 = 60;
const DEFAULT_MAX_CACHE_AGE_SECS: u64 = 300;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
/// Keeps a zero interval from turning the refresh loop into a busy-loop.
const MIN_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// Sheet URL or local CSV path used until a refresh names another one.
    pub default_source: String,
    /// Worksheet tab used for sheet URLs that do not carry `gid=`.
    pub sheet_gid: String,
    pub refresh_interval: Duration,
    /// Staleness window: snapshots older than this are refreshed on read.
    pub max_cache_age: Duration,
    pub fetch_timeout: Duration,
    pub enable_auto_refresh: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            default_source: DEFAULT_SOURCE.to_string(),
            sheet_gid: DEFAULT_SHEET_GID.to_string(),
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_SECS),
            max_cache_age: Duration::from_secs(DEFAULT_MAX_CACHE_AGE_SECS),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            enable_auto_refresh: true,
        }
    }
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from any name -> value lookup; `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let default_source = lookup("CAMPAIGN_SOURCE")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.default_source);
        let sheet_gid = lookup("SHEET_GID")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.sheet_gid);
        let refresh_interval =
            seconds(&lookup, "REFRESH_INTERVAL", defaults.refresh_interval)?.max(MIN_INTERVAL);
        let max_cache_age = seconds(&lookup, "MAX_CACHE_AGE", defaults.max_cache_age)?;
        let fetch_timeout =
            seconds(&lookup, "FETCH_TIMEOUT", defaults.fetch_timeout)?.max(MIN_INTERVAL);
        let enable_auto_refresh = match lookup("ENABLE_AUTO_REFRESH") {
            None => defaults.enable_auto_refresh,
            Some(value) => {
                let flag = value.trim().to_ascii_lowercase();
                match flag.as_str() {
                    "true" | "1" | "yes" => true,
                    "false" | "0" | "no" => false,
                    _ => {
                        return Err(ConfigError::InvalidFlag {
                            name: "ENABLE_AUTO_REFRESH",
                            value,
                        })
                    }
                }
            }
        };
        Ok(Self {
            default_source,
            sheet_gid,
            refresh_interval,
            max_cache_age,
            fetch_timeout,
            enable_auto_refresh,
        })
    }
}

fn seconds<F>(lookup: &F, name: &'static str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| ConfigError::InvalidSeconds { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<DashboardConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DashboardConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = config_from(&[]).unwrap();
        assert_eq!(cfg, DashboardConfig::default());
        assert_eq!(cfg.refresh_interval, Duration::from_secs(60));
        assert_eq!(cfg.max_cache_age, Duration::from_secs(300));
        assert_eq!(cfg.fetch_timeout, Duration::from_secs(30));
        assert!(cfg.enable_auto_refresh);
    }

    #[test]
    fn reads_overrides() {
        let cfg = config_from(&[
            ("CAMPAIGN_SOURCE", " https://docs.google.com/spreadsheets/d/abc/edit "),
            ("REFRESH_INTERVAL", "15"),
            ("MAX_CACHE_AGE", "0"),
            ("ENABLE_AUTO_REFRESH", "False"),
            ("SHEET_GID", "42"),
        ])
        .unwrap();
        assert_eq!(cfg.default_source, "https://docs.google.com/spreadsheets/d/abc/edit");
        assert_eq!(cfg.refresh_interval, Duration::from_secs(15));
        assert_eq!(cfg.max_cache_age, Duration::ZERO);
        assert!(!cfg.enable_auto_refresh);
        assert_eq!(cfg.sheet_gid, "42");
    }

    #[test]
    fn zero_refresh_interval_is_clamped() {
        let cfg = config_from(&[("REFRESH_INTERVAL", "0")]).unwrap();
        assert_eq!(cfg.refresh_interval, MIN_INTERVAL);
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(matches!(
            config_from(&[("MAX_CACHE_AGE", "five")]),
            Err(ConfigError::InvalidSeconds { name: "MAX_CACHE_AGE", .. })
        ));
        assert!(matches!(
            config_from(&[("ENABLE_AUTO_REFRESH", "maybe")]),
            Err(ConfigError::InvalidFlag { .. })
        ));
    }
}
