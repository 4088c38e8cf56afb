//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of routes the cache can hold
    pub cache_capacity: usize,
    /// Cache entry lifetime in seconds
    pub cache_ttl: u64,
    /// Deadline in seconds for a single transport call
    pub transport_timeout: u64,
    /// Base URL of the routing backend
    pub provider_base_url: String,
    /// HTTP server port
    pub server_port: u16,
    /// Background expiry sweep interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum cached routes (default: 20)
    /// - `CACHE_TTL` - Entry lifetime in seconds (default: 1800)
    /// - `TRANSPORT_TIMEOUT` - Transport deadline in seconds (default: 30)
    /// - `PROVIDER_BASE_URL` - Routing backend base URL (default: http://localhost:5001)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 60)
    pub fn from_env() -> Self {
        Self {
            cache_capacity: env::var("CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(20),
            cache_ttl: env::var("CACHE_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1800),
            transport_timeout: env::var("TRANSPORT_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            provider_base_url: env::var("PROVIDER_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:5001".to_string()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            cleanup_interval: env::var("CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_capacity: 20,
            cache_ttl: 1800,
            transport_timeout: 30,
            provider_base_url: "http://localhost:5001".to_string(),
            server_port: 3000,
            cleanup_interval: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.cache_capacity, 20);
        assert_eq!(config.cache_ttl, 1800);
        assert_eq!(config.transport_timeout, 30);
        assert_eq!(config.provider_base_url, "http://localhost:5001");
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cleanup_interval, 60);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("CACHE_CAPACITY");
        env::remove_var("CACHE_TTL");
        env::remove_var("TRANSPORT_TIMEOUT");
        env::remove_var("PROVIDER_BASE_URL");
        env::remove_var("SERVER_PORT");
        env::remove_var("CLEANUP_INTERVAL");

        let config = Config::from_env();
        assert_eq!(config.cache_capacity, 20);
        assert_eq!(config.cache_ttl, 1800);
        assert_eq!(config.transport_timeout, 30);
        assert_eq!(config.server_port, 3000);
    }
}
