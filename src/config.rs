use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::application::monitor::MonitorConfig;

/// Environment-sourced configuration with documented defaults.
///
/// Recognized variables: `TELEGRAM_BOT_TOKEN` (required), `CHECK_INTERVAL`
/// (3600 s), `INITIAL_DELAY` (30 s), `RANDOM_DELAY_MIN` (10 s),
/// `RANDOM_DELAY_MAX` (20 s), `DEBUG_MODE` (false), `DATA_FILE`
/// (data/products.json), `MAX_PRODUCTS_PER_OWNER` (0 = unlimited),
/// `FAILURE_NOTICE_THRESHOLD` (3).
#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_token: String,
    pub check_interval: Duration,
    pub initial_delay: Duration,
    pub random_delay_min: Duration,
    pub random_delay_max: Duration,
    pub debug_mode: bool,
    pub data_file: PathBuf,
    pub max_products_per_owner: usize,
    pub failure_notice_threshold: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any name → value source; `from_env` plugs in the process
    /// environment, tests plug in a map
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let config = Self {
            telegram_token: lookup("TELEGRAM_BOT_TOKEN")
                .context("TELEGRAM_BOT_TOKEN is not set")?,
            check_interval: seconds(&lookup, "CHECK_INTERVAL", 3600)?,
            initial_delay: seconds(&lookup, "INITIAL_DELAY", 30)?,
            random_delay_min: seconds(&lookup, "RANDOM_DELAY_MIN", 10)?,
            random_delay_max: seconds(&lookup, "RANDOM_DELAY_MAX", 20)?,
            debug_mode: lookup("DEBUG_MODE")
                .map(|raw| parse_bool(&raw))
                .unwrap_or(false),
            data_file: lookup("DATA_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/products.json")),
            max_products_per_owner: integer(&lookup, "MAX_PRODUCTS_PER_OWNER", 0usize)?,
            failure_notice_threshold: integer(&lookup, "FAILURE_NOTICE_THRESHOLD", 3u32)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.random_delay_min > self.random_delay_max {
            bail!(
                "RANDOM_DELAY_MIN ({}s) must not exceed RANDOM_DELAY_MAX ({}s)",
                self.random_delay_min.as_secs(),
                self.random_delay_max.as_secs()
            );
        }
        Ok(())
    }

    /// Scheduler view of this configuration
    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            initial_delay: self.initial_delay,
            check_interval: self.check_interval,
            random_delay_min: self.random_delay_min,
            random_delay_max: self.random_delay_max,
            failure_notice_threshold: self.failure_notice_threshold,
        }
    }
}

/// Parse straight into the target type so out-of-range values fail loudly
/// instead of truncating
fn integer<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} must be an integer, got {raw:?}")),
        None => Ok(default),
    }
}

fn seconds(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: u64) -> Result<Duration> {
    Ok(Duration::from_secs(integer(lookup, name, default)?))
}

fn parse_bool(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), "true" | "1" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_map(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_only_the_token_is_set() {
        let config = from_map(&[("TELEGRAM_BOT_TOKEN", "123:abc")]).unwrap();
        assert_eq!(config.check_interval, Duration::from_secs(3600));
        assert_eq!(config.initial_delay, Duration::from_secs(30));
        assert_eq!(config.random_delay_min, Duration::from_secs(10));
        assert_eq!(config.random_delay_max, Duration::from_secs(20));
        assert!(!config.debug_mode);
        assert_eq!(config.data_file, PathBuf::from("data/products.json"));
        assert_eq!(config.max_products_per_owner, 0);
    }

    #[test]
    fn missing_token_is_an_error() {
        assert!(from_map(&[]).is_err());
    }

    #[test]
    fn jitter_bounds_are_checked_at_startup() {
        let result = from_map(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("RANDOM_DELAY_MIN", "30"),
            ("RANDOM_DELAY_MAX", "20"),
        ]);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("RANDOM_DELAY_MIN"));
    }

    #[test]
    fn garbage_integers_are_rejected_with_the_variable_name() {
        let result = from_map(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("CHECK_INTERVAL", "soon"),
        ]);
        assert!(result.unwrap_err().to_string().contains("CHECK_INTERVAL"));
    }

    #[test]
    fn out_of_range_integers_are_rejected_not_truncated() {
        // would silently become 1 if narrowed through a wider parse
        let result = from_map(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("FAILURE_NOTICE_THRESHOLD", "4294967297"),
        ]);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("FAILURE_NOTICE_THRESHOLD"));
    }

    #[test]
    fn debug_mode_accepts_common_truthy_spellings() {
        for raw in ["true", "True", "1", "yes"] {
            let config =
                from_map(&[("TELEGRAM_BOT_TOKEN", "t"), ("DEBUG_MODE", raw)]).unwrap();
            assert!(config.debug_mode, "{raw} should enable debug mode");
        }
        let config = from_map(&[("TELEGRAM_BOT_TOKEN", "t"), ("DEBUG_MODE", "False")]).unwrap();
        assert!(!config.debug_mode);
    }
}
