use crate::logging::parse_level;
use anyhow::{Result, anyhow};
use log::LevelFilter;
use std::env;
use std::time::Duration;

pub const DEFAULT_DATABASE_PATH: &str = "rota.db";
pub const DEFAULT_TICK_MS: u64 = 1000;
pub const DEFAULT_REST_SECONDS: u32 = 90;

#[derive(Debug, Clone, PartialEq)]
pub struct RotaConfig {
    pub database_path: String,
    pub tick_interval: Duration,
    /// Countdown used when a target set carries no rest time of its own.
    pub default_rest_seconds: u32,
    pub log_level: LevelFilter,
}

impl Default for RotaConfig {
    fn default() -> Self {
        Self {
            database_path: DEFAULT_DATABASE_PATH.to_string(),
            tick_interval: Duration::from_millis(DEFAULT_TICK_MS),
            default_rest_seconds: DEFAULT_REST_SECONDS,
            log_level: LevelFilter::Warn,
        }
    }
}

impl RotaConfig {
    /// Read `DATABASE_URL`, `ROTA_TICK_MS`, `ROTA_DEFAULT_REST_SECONDS` and `ROTA_LOG`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = lookup("DATABASE_URL") {
            let path = path.strip_prefix("sqlite://").unwrap_or(&path);
            if !path.is_empty() {
                config.database_path = path.to_string();
            }
        }

        if let Some(ms) = lookup("ROTA_TICK_MS") {
            let ms: u64 = ms
                .trim()
                .parse()
                .map_err(|e| anyhow!("invalid ROTA_TICK_MS {:?}: {}", ms, e))?;
            if ms == 0 {
                return Err(anyhow!("ROTA_TICK_MS must be greater than zero"));
            }
            config.tick_interval = Duration::from_millis(ms);
        }

        if let Some(secs) = lookup("ROTA_DEFAULT_REST_SECONDS") {
            config.default_rest_seconds = secs
                .trim()
                .parse()
                .map_err(|e| anyhow!("invalid ROTA_DEFAULT_REST_SECONDS {:?}: {}", secs, e))?;
        }

        if let Some(level) = lookup("ROTA_LOG") {
            config.log_level =
                parse_level(&level).ok_or_else(|| anyhow!("invalid ROTA_LOG level {:?}", level))?;
        }

        Ok(config)
    }
}
