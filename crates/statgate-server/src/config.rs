//! Environment-driven configuration.
//!
//! Every knob has a default; out-of-range values are clamped with a
//! warning. Only two things are fatal at startup: a missing provider API
//! key and an unparseable bind address.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PROVIDER_API_KEY (or STEAM_API_KEY) is not set")]
    MissingApiKey,
    #[error("invalid bind address {0:?}")]
    InvalidBindAddr(String),
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub default_ttl: Duration,
    pub max_entries: usize,
    pub max_memory_bytes: usize,
    pub cleanup_interval: Duration,
    pub player_stats_ttl: Duration,
    pub player_achievements_ttl: Duration,
    pub schema_ttl: Duration,
}

#[derive(Debug, Clone)]
pub struct BreakerSettings {
    pub max_failures: u32,
    pub reset_timeout: Duration,
    pub half_open_max_calls: u32,
    pub success_threshold: u32,
}

#[derive(Debug, Clone)]
pub struct RetrySettings {
    pub max_retries: u32,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
}

#[derive(Debug, Clone)]
pub struct TimeoutSettings {
    /// Per upstream attempt.
    pub api_timeout: Duration,
    /// Whole composite fan-out.
    pub overall_timeout: Duration,
    /// Optional tighter bound for the achievements source.
    pub achievements_timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub api_key: String,
    pub app_id: u64,
    pub log_level: String,
    pub cache: CacheSettings,
    pub breaker: BreakerSettings,
    pub retry: RetrySettings,
    pub timeouts: TimeoutSettings,
    pub shutdown_grace: Duration,
    pub adept_map_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("PROVIDER_API_KEY")
            .or_else(|_| std::env::var("STEAM_API_KEY"))
            .map_err(|_| ConfigError::MissingApiKey)?;

        let bind_raw = env_string("BIND_ADDR", "0.0.0.0:8080");
        let bind_addr = bind_raw
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr(bind_raw))?;

        let default_ttl = env_secs("CACHE_DEFAULT_TTL", 300, 1, 86_400);

        Ok(Self {
            bind_addr,
            api_key,
            app_id: env_u64("PROVIDER_APP_ID", 381_210),
            log_level: env_string("LOG_LEVEL", "info"),
            cache: CacheSettings {
                default_ttl,
                max_entries: env_u64("CACHE_MAX_ENTRIES", 10_000).min(100_000) as usize,
                max_memory_bytes: (env_u64("CACHE_MAX_MEMORY_MB", 100) * 1024 * 1024) as usize,
                cleanup_interval: env_secs("CACHE_CLEANUP_INTERVAL", 30, 10, 3_600),
                player_stats_ttl: env_secs_or("CACHE_PLAYER_STATS_TTL", default_ttl),
                player_achievements_ttl: env_secs_or("CACHE_PLAYER_ACHIEVEMENTS_TTL", default_ttl),
                schema_ttl: env_secs_or("CACHE_SCHEMA_TTL", Duration::from_secs(6 * 3600)),
            },
            breaker: BreakerSettings {
                max_failures: env_u64("CIRCUIT_BREAKER_MAX_FAILURES", 5) as u32,
                reset_timeout: env_secs("CIRCUIT_BREAKER_RESET_TIMEOUT", 60, 1, 3_600),
                half_open_max_calls: env_u64("CIRCUIT_BREAKER_HALF_OPEN_MAX_CALLS", 3) as u32,
                success_threshold: env_u64("CIRCUIT_BREAKER_SUCCESS_RESET", 3) as u32,
            },
            retry: RetrySettings {
                max_retries: env_u64("MAX_RETRIES", 3) as u32,
                base_backoff: Duration::from_millis(env_u64("BASE_BACKOFF_MS", 100)),
                max_backoff: Duration::from_millis(env_u64("MAX_BACKOFF_MS", 30_000)),
            },
            timeouts: TimeoutSettings {
                api_timeout: env_secs("API_TIMEOUT_SECS", 10, 1, 120),
                overall_timeout: env_secs("OVERALL_TIMEOUT_SECS", 30, 1, 300),
                achievements_timeout: env_secs_opt("ACHIEVEMENTS_TIMEOUT_SECS"),
            },
            shutdown_grace: env_secs("SHUTDOWN_GRACE_SECS", 10, 1, 120),
            adept_map_path: std::env::var("ADEPT_MAP_PATH").ok().map(PathBuf::from),
        })
    }
}

fn env_string(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_u64(name: &str, default: u64) -> u64 {
    match std::env::var(name) {
        Err(_) => default,
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(var = name, value = %raw, default, "unparseable env value, using default");
                default
            }
        },
    }
}

fn env_secs(name: &str, default: u64, min: u64, max: u64) -> Duration {
    let value = env_u64(name, default);
    if value < min || value > max {
        let clamped = value.clamp(min, max);
        tracing::warn!(var = name, value, clamped, "env value out of range, clamping");
        Duration::from_secs(clamped)
    } else {
        Duration::from_secs(value)
    }
}

fn env_secs_or(name: &str, default: Duration) -> Duration {
    env_secs(name, default.as_secs(), 1, 86_400)
}

fn env_secs_opt(name: &str) -> Option<Duration> {
    std::env::var(name)
        .ok()
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
