//! Configuration for the apply worker.

use crate::dispatch::RetryPolicy;
use crate::error::{WorkerError, WorkerResult};
use channel_bus::BusConfig;
use expense_protocol_types::DEAD_LETTER_CHANNEL;
use std::path::PathBuf;
use std::time::Duration;

/// Apply worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Redis connection URL
    pub redis_url: String,

    /// Path to the SQLite database file
    pub database_path: PathBuf,

    /// How long to wait before redialing a lost subscription
    pub reconnect_delay: Duration,

    /// Retry policy for store failures
    pub retry: RetryPolicy,

    /// Channel poison messages are routed to after retries are exhausted
    pub dead_letter_channel: String,
}

impl WorkerConfig {
    /// Build a config from defaults, overridable via environment
    /// variables (`REDIS_URL`, `OUTGO_DB_PATH`, `OUTGO_RECONNECT_MS`,
    /// `OUTGO_APPLY_MAX_ATTEMPTS`).
    pub fn new() -> WorkerResult<Self> {
        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());

        let database_path = std::env::var("OUTGO_DB_PATH")
            .map(PathBuf::from)
            .ok()
            .or_else(default_database_path)
            .ok_or_else(|| {
                WorkerError::Config(
                    "no home directory and OUTGO_DB_PATH not set; cannot place the database"
                        .to_string(),
                )
            })?;

        let reconnect_ms: u64 = std::env::var("OUTGO_RECONNECT_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1000);

        let max_attempts: u32 = std::env::var("OUTGO_APPLY_MAX_ATTEMPTS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        Ok(Self {
            redis_url,
            database_path,
            reconnect_delay: Duration::from_millis(reconnect_ms),
            retry: RetryPolicy {
                max_attempts,
                ..RetryPolicy::default()
            },
            dead_letter_channel: DEAD_LETTER_CHANNEL.to_string(),
        })
    }

    /// Bus settings for both the subscription and the dead-letter
    /// publisher.
    pub fn bus_config(&self) -> BusConfig {
        BusConfig::new(self.redis_url.clone())
    }
}

fn default_database_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".outgo").join("expenses.db"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bus_config_carries_the_url() {
        let config = WorkerConfig {
            redis_url: "redis://bus.internal:6380".to_string(),
            database_path: PathBuf::from("/tmp/expenses.db"),
            reconnect_delay: Duration::from_secs(1),
            retry: RetryPolicy::default(),
            dead_letter_channel: DEAD_LETTER_CHANNEL.to_string(),
        };
        assert_eq!(config.bus_config().url, "redis://bus.internal:6380");
    }

    #[test]
    fn defaults_point_at_local_bus_and_dead_letter_channel() {
        let config = WorkerConfig::new().unwrap();
        assert!(config.redis_url.starts_with("redis://"));
        assert_eq!(config.dead_letter_channel, "dead-letter-expense");
        assert!(config.retry.max_attempts >= 1);
    }
}
