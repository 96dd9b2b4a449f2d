//! Configuration Module
//!
//! Handles loading and managing proxy configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ProxyError, Result};

/// Proxy configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to
    pub host: String,
    /// HTTP server port
    pub port: u16,
    /// Maximum number of keys the cache can hold
    pub max_keys: usize,
    /// Time-to-live of a cached value in milliseconds
    pub ttl_ms: u64,
    /// Backing Redis host
    pub redis_host: String,
    /// Backing Redis port
    pub redis_port: u16,
    /// Admitted requests per second, 0 disables admission control
    pub rate_limit_rps: u64,
    /// Burst size for admission control
    pub rate_limit_burst: u64,
    /// Maximum number of lookups waiting for the cache worker
    pub worker_queue_capacity: usize,
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `PROXY_HOST` - Bind address (default: 0.0.0.0)
    /// - `PROXY_PORT` - HTTP server port (default: 8000)
    /// - `PROXY_MAX_KEYS` - Cache capacity in keys (default: 1000)
    /// - `PROXY_TTL_MS` - Entry TTL in milliseconds (default: 60000)
    /// - `REDIS_HOST` - Backing store host (default: 127.0.0.1)
    /// - `REDIS_PORT` - Backing store port (default: 6379)
    /// - `RATE_LIMIT_RPS` - Admitted requests per second (default: 0, off)
    /// - `RATE_LIMIT_BURST` - Admission burst size (default: 100)
    /// - `WORKER_QUEUE_CAPACITY` - Pending lookup limit (default: 1024)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env_or("PROXY_HOST", defaults.host),
            port: env_or("PROXY_PORT", defaults.port),
            max_keys: env_or("PROXY_MAX_KEYS", defaults.max_keys),
            ttl_ms: env_or("PROXY_TTL_MS", defaults.ttl_ms),
            redis_host: env_or("REDIS_HOST", defaults.redis_host),
            redis_port: env_or("REDIS_PORT", defaults.redis_port),
            rate_limit_rps: env_or("RATE_LIMIT_RPS", defaults.rate_limit_rps),
            rate_limit_burst: env_or("RATE_LIMIT_BURST", defaults.rate_limit_burst),
            worker_queue_capacity: env_or(
                "WORKER_QUEUE_CAPACITY",
                defaults.worker_queue_capacity,
            ),
        }
    }

    /// Rejects settings the proxy cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.max_keys == 0 {
            return Err(ProxyError::InvalidCapacity(self.max_keys));
        }
        if self.worker_queue_capacity == 0 {
            return Err(ProxyError::Config(
                "WORKER_QUEUE_CAPACITY must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Entry TTL as a Duration.
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_keys: 1000,
            ttl_ms: 60_000,
            redis_host: "127.0.0.1".to_string(),
            redis_port: 6379,
            rate_limit_rps: 0,
            rate_limit_burst: 100,
            worker_queue_capacity: 1024,
        }
    }
}
