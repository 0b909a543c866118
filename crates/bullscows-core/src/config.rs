//! Configuration resolution for the Bulls and Cows server.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Settings file (~/.config/bullscows/settings.json or an explicit path)
//! 3. Environment variables
//! 4. CLI arguments (applied by the binary, highest priority)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Error, Result};

/// Environment variable holding the lifetime of a new game, in seconds.
pub const MAX_GAME_ACTIVE_TIME_ENV: &str = "MAX_GAME_ACTIVE_TIME";
pub const LEDGER_SWEEP_SECS_ENV: &str = "BULLSCOWS_LEDGER_SWEEP_SECS";
pub const CREATE_PER_MINUTE_ENV: &str = "BULLSCOWS_CREATE_PER_MINUTE";
pub const ATTEMPT_PER_MINUTE_ENV: &str = "BULLSCOWS_ATTEMPT_PER_MINUTE";

/// Complete server configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub rate_limits: RateLimitConfig,
}

/// Game lifecycle settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Seconds a freshly created game stays playable.
    pub max_active_secs: i64,
    /// Interval between sweeps of expired attempt ledger entries.
    pub ledger_sweep_secs: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_active_secs: 600,
            ledger_sweep_secs: 60,
        }
    }
}

/// Per-client request limits.
///
/// Enforcement belongs to the fronting proxy; the server only reports them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub create_per_minute: u32,
    pub attempt_per_minute: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            create_per_minute: 5,
            attempt_per_minute: 60,
        }
    }
}

/// Load configuration with hierarchical resolution.
///
/// An explicit `settings_path` replaces the global settings file lookup.
pub fn load_config(settings_path: Option<&Path>) -> Result<Config> {
    let mut config = Config::default();

    let path = settings_path.map(Path::to_path_buf).or_else(global_config_path);
    if let Some(path) = path {
        if path.exists() {
            config = load_config_file(&path)?;
        } else if settings_path.is_some() {
            return Err(Error::Config(format!(
                "Settings file {} does not exist",
                path.display()
            )));
        }
    }

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate(&config)?;

    Ok(config)
}

/// Get the global settings file path.
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("bullscows").join("settings.json"))
}

/// Default location of the games database.
pub fn database_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".bullscows").join("games.db"))
}

fn load_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

fn apply_env_overrides(
    config: &mut Config,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(n) = parse_env(&lookup, MAX_GAME_ACTIVE_TIME_ENV)? {
        config.game.max_active_secs = n;
    }
    if let Some(n) = parse_env(&lookup, LEDGER_SWEEP_SECS_ENV)? {
        config.game.ledger_sweep_secs = n;
    }
    if let Some(n) = parse_env(&lookup, CREATE_PER_MINUTE_ENV)? {
        config.rate_limits.create_per_minute = n;
    }
    if let Some(n) = parse_env(&lookup, ATTEMPT_PER_MINUTE_ENV)? {
        config.rate_limits.attempt_per_minute = n;
    }
    Ok(())
}

fn parse_env<T: FromStr>(
    lookup: impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>> {
    lookup(key)
        .map(|val| {
            val.trim()
                .parse()
                .map_err(|_| Error::Config(format!("{key} must be an integer, got {val:?}")))
        })
        .transpose()
}

/// Reject settings the lifecycle cannot work with.
pub fn validate(config: &Config) -> Result<()> {
    if config.game.max_active_secs <= 0 {
        return Err(Error::Config(format!(
            "max_active_secs must be positive, got {}",
            config.game.max_active_secs
        )));
    }
    if config.game.ledger_sweep_secs == 0 {
        return Err(Error::Config("ledger_sweep_secs must be positive".into()));
    }
    if config.rate_limits.create_per_minute == 0 || config.rate_limits.attempt_per_minute == 0 {
        return Err(Error::Config("rate limits must be positive".into()));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config_has_stock_rate_limits() {
        let config = Config::default();
        assert_eq!(config.rate_limits.create_per_minute, 5);
        assert_eq!(config.rate_limits.attempt_per_minute, 60);
    }

    #[test]
    fn env_sets_max_active_time() {
        let mut config = Config::default();
        apply_env_overrides(&mut config, env(&[(MAX_GAME_ACTIVE_TIME_ENV, "120")])).unwrap();
        assert_eq!(config.game.max_active_secs, 120);
    }

    #[test]
    fn malformed_max_active_time_is_rejected() {
        let mut config = Config::default();
        let err = apply_env_overrides(&mut config, env(&[(MAX_GAME_ACTIVE_TIME_ENV, "soon")]));
        assert!(matches!(err, Err(Error::Config(_))));
    }

    #[test]
    fn env_sets_sweep_and_rate_limits() {
        let mut config = Config::default();
        apply_env_overrides(
            &mut config,
            env(&[
                (LEDGER_SWEEP_SECS_ENV, "15"),
                (CREATE_PER_MINUTE_ENV, "10"),
                (ATTEMPT_PER_MINUTE_ENV, " 90 "),
            ]),
        )
        .unwrap();
        assert_eq!(config.game.ledger_sweep_secs, 15);
        assert_eq!(config.rate_limits.create_per_minute, 10);
        assert_eq!(config.rate_limits.attempt_per_minute, 90);
    }

    #[test]
    fn malformed_sweep_and_rate_limits_are_rejected() {
        for key in [LEDGER_SWEEP_SECS_ENV, CREATE_PER_MINUTE_ENV, ATTEMPT_PER_MINUTE_ENV] {
            let mut config = Config::default();
            let err = apply_env_overrides(&mut config, env(&[(key, "lots")])).unwrap_err();
            assert!(err.to_string().contains(key), "{err}");
        }
    }

    #[test]
    fn zero_rate_limit_fails_validation() {
        let mut config = Config::default();
        config.rate_limits.create_per_minute = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn non_positive_lifetime_fails_validation() {
        let mut config = Config::default();
        config.game.max_active_secs = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn settings_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"game": {"max_active_secs": 30, "ledger_sweep_secs": 5}}"#)
            .unwrap();

        let config = load_config_file(&path).unwrap();
        assert_eq!(config.game.max_active_secs, 30);
        assert_eq!(config.game.ledger_sweep_secs, 5);
        assert_eq!(config.rate_limits.create_per_minute, 5);
    }

    #[test]
    fn missing_explicit_settings_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(load_config(Some(&missing)).is_err());
    }
}
