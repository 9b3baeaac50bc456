//! Bus connection configuration.

use std::time::Duration;

/// Connection settings for the channel bus.
#[derive(Debug, Clone)]
pub struct BusConfig {
    /// Redis connection URL.
    pub url: String,

    /// How long to wait for a connection to come up.
    pub connect_timeout: Duration,

    /// How long to wait for a single publish to be accepted.
    pub operation_timeout: Duration,
}

impl BusConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            connect_timeout: Duration::from_secs(5),
            operation_timeout: Duration::from_secs(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = BusConfig::default();
        assert_eq!(config.url, "redis://127.0.0.1:6379");
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.operation_timeout, Duration::from_secs(5));
    }

    #[test]
    fn new_overrides_url_only() {
        let config = BusConfig::new("redis://bus.internal:6380");
        assert_eq!(config.url, "redis://bus.internal:6380");
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
    }
}
