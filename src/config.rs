// ⚙️ Configuration - environment variables with working defaults
//
// Every knob has a default so the binary runs with no setup at all.
// Malformed numeric values are logged and fall back to the default rather
// than failing startup.

use std::path::PathBuf;
use std::time::Duration;

use log::warn;

pub const DEFAULT_SOURCE_URL: &str = "https://norac.co.ke";
const DEFAULT_DB_PATH: &str = "projects.db";
const DEFAULT_INTERVAL_SECS: u64 = 3600;
const DEFAULT_FETCH_ATTEMPTS: u64 = 3;
const DEFAULT_FETCH_DELAY_SECS: u64 = 2;

#[derive(Debug, Clone)]
pub struct Config {
    /// Listing page to mirror.
    pub source_url: String,

    /// SQLite database holding the `projects` and `changes` tables.
    pub db_path: PathBuf,

    /// Time between scheduled reconciliation cycles.
    pub interval: Duration,

    /// Fetch retry budget (total attempts, not retries after the first).
    pub fetch_attempts: u32,

    /// Fixed delay between fetch attempts.
    pub fetch_delay: Duration,
}

impl Config {
    /// Build configuration from `MIRROR_*` environment variables.
    pub fn from_env() -> Self {
        let interval_secs = parse_u64(
            "MIRROR_INTERVAL_SECS",
            std::env::var("MIRROR_INTERVAL_SECS").ok(),
            DEFAULT_INTERVAL_SECS,
        )
        // Sub-second schedules are always a misconfiguration
        .max(1);

        let fetch_attempts = parse_u64(
            "MIRROR_FETCH_ATTEMPTS",
            std::env::var("MIRROR_FETCH_ATTEMPTS").ok(),
            DEFAULT_FETCH_ATTEMPTS,
        )
        .min(u32::MAX as u64) as u32;

        let fetch_delay_secs = parse_u64(
            "MIRROR_FETCH_DELAY_SECS",
            std::env::var("MIRROR_FETCH_DELAY_SECS").ok(),
            DEFAULT_FETCH_DELAY_SECS,
        );

        Config {
            source_url: env_or("MIRROR_SOURCE_URL", DEFAULT_SOURCE_URL),
            db_path: PathBuf::from(env_or("MIRROR_DB_PATH", DEFAULT_DB_PATH)),
            interval: Duration::from_secs(interval_secs),
            fetch_attempts,
            fetch_delay: Duration::from_secs(fetch_delay_secs),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            fetch_attempts: DEFAULT_FETCH_ATTEMPTS as u32,
            fetch_delay: Duration::from_secs(DEFAULT_FETCH_DELAY_SECS),
        }
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_u64(name: &str, raw: Option<String>, default: u64) -> u64 {
    match raw {
        None => default,
        Some(value) => match value.trim().parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(
                    "ignoring malformed {}={:?}, using default {}",
                    name, value, default
                );
                default
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_u64_accepts_valid_input() {
        assert_eq!(parse_u64("X", Some("120".to_string()), 3600), 120);
        assert_eq!(parse_u64("X", Some(" 120 ".to_string()), 3600), 120);
    }

    #[test]
    fn test_parse_u64_falls_back_on_garbage() {
        assert_eq!(parse_u64("X", Some("soon".to_string()), 3600), 3600);
        assert_eq!(parse_u64("X", Some("-5".to_string()), 3600), 3600);
        assert_eq!(parse_u64("X", None, 3600), 3600);
    }

    #[test]
    fn test_defaults_match_service_expectations() {
        let config = Config::default();
        assert_eq!(config.interval, Duration::from_secs(3600));
        assert_eq!(config.fetch_attempts, 3);
        assert_eq!(config.fetch_delay, Duration::from_secs(2));
    }
}
