//! Typed configuration surface, one struct per external dependency.

use std::time::Duration;

use core_config::{env_or_default, env_required, ConfigError, Environment, FromEnv};
use database::postgres::PostgresConfig;
use database::redis::RedisConfig;

pub use core_config::Environment as AppEnvironment;

/// Relayer Job tuning: how many rows to claim per tick, how long to wait on a
/// single `Send` call, and the retry ceiling.
#[derive(Clone, Debug)]
pub struct RelayerConfig {
    pub batch_size: u64,
    pub send_timeout: Duration,
    pub max_attempts: i32,
}

impl FromEnv for RelayerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let batch_size = env_or_default("RELAYER_BATCH_SIZE", "50")
            .parse()
            .map_err(|e| ConfigError::ParseError {
                key: "RELAYER_BATCH_SIZE".to_string(),
                details: format!("{e}"),
            })?;

        let send_timeout_secs: u64 = env_or_default("RELAYER_SEND_TIMEOUT_SECS", "10")
            .parse()
            .map_err(|e| ConfigError::ParseError {
                key: "RELAYER_SEND_TIMEOUT_SECS".to_string(),
                details: format!("{e}"),
            })?;

        let max_attempts = env_or_default("RELAYER_MAX_ATTEMPTS", "5")
            .parse()
            .map_err(|e| ConfigError::ParseError {
                key: "RELAYER_MAX_ATTEMPTS".to_string(),
                details: format!("{e}"),
            })?;

        Ok(Self {
            batch_size,
            send_timeout: Duration::from_secs(send_timeout_secs),
            max_attempts,
        })
    }
}

/// Upstream gateway the Relayer Job sends messages to.
#[derive(Clone, Debug)]
pub struct WebhookConfig {
    pub url: String,
    pub auth_key: String,
    pub timeout: Duration,
}

impl FromEnv for WebhookConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let url = env_required("WEBHOOK_URL")?;
        let auth_key = env_or_default("WEBHOOK_AUTH_KEY", "");
        let timeout_secs: u64 = env_or_default("WEBHOOK_TIMEOUT_SECS", "10")
            .parse()
            .map_err(|e| ConfigError::ParseError {
                key: "WEBHOOK_TIMEOUT_SECS".to_string(),
                details: format!("{e}"),
            })?;

        Ok(Self {
            url,
            auth_key,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// How often the Scheduler fires the Relayer Job.
#[derive(Clone, Debug)]
pub struct ScheduleConfig {
    pub interval: Duration,
}

impl FromEnv for ScheduleConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let interval_secs: u64 = env_or_default("SCHEDULE_INTERVAL_SECS", "30")
            .parse()
            .map_err(|e| ConfigError::ParseError {
                key: "SCHEDULE_INTERVAL_SECS".to_string(),
                details: format!("{e}"),
            })?;

        Ok(Self {
            interval: Duration::from_secs(interval_secs),
        })
    }
}

/// Whether to run migrations at startup. The filesystem-path notion of the
/// system this was distilled from does not apply to a migrator compiled into
/// the binary; this is a boolean toggle instead.
#[derive(Clone, Debug)]
pub struct MigrationConfig {
    pub run_migrations: bool,
}

impl FromEnv for MigrationConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let run_migrations = env_or_default("RUN_MIGRATIONS", "true")
            .parse()
            .map_err(|e| ConfigError::ParseError {
                key: "RUN_MIGRATIONS".to_string(),
                details: format!("{e}"),
            })?;

        Ok(Self { run_migrations })
    }
}

/// Cache TTL, layered on top of `database::redis::RedisConfig`'s connection fields.
#[derive(Clone, Debug)]
pub struct CacheConfig {
    pub redis: RedisConfig,
    pub ttl: Duration,
}

impl FromEnv for CacheConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let redis = RedisConfig::from_env()?;
        let ttl_secs: u64 = env_or_default("CACHE_TTL_SECS", "86400")
            .parse()
            .map_err(|e| ConfigError::ParseError {
                key: "CACHE_TTL_SECS".to_string(),
                details: format!("{e}"),
            })?;

        Ok(Self {
            redis,
            ttl: Duration::from_secs(ttl_secs),
        })
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub environment: Environment,
    pub postgres: PostgresConfig,
    pub cache: CacheConfig,
    pub relayer: RelayerConfig,
    pub webhook: WebhookConfig,
    pub schedule: ScheduleConfig,
    pub migration: MigrationConfig,
    pub server: core_config::server::ServerConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            environment: Environment::from_env(),
            postgres: PostgresConfig::from_env()?,
            cache: CacheConfig::from_env()?,
            relayer: RelayerConfig::from_env()?,
            webhook: WebhookConfig::from_env()?,
            schedule: ScheduleConfig::from_env()?,
            migration: MigrationConfig::from_env()?,
            server: core_config::server::ServerConfig::from_env()?,
        })
    }
}
