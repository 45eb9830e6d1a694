//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::{validate_sizing, BackpressurePolicy};
use crate::error::ConfigError;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of resident cache entries before eviction fires
    pub cache_capacity: usize,
    /// Entries evicted each time a new key pushes the cache over capacity
    pub eviction_batch_size: usize,
    /// Seconds a fetched banner stays fresh in the cache
    pub cache_ttl: u64,
    /// How eviction notifications reach the drain task
    pub eviction_backpressure: BackpressurePolicy,
    /// Bound of the eviction notification channel
    pub eviction_channel_capacity: usize,
    /// HTTP server port
    pub server_port: u16,
    /// Optional JSON file of banners loaded at startup
    pub banner_seed_file: Option<PathBuf>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum cache entries (default: 1000)
    /// - `EVICTION_BATCH_SIZE` - Entries evicted per over-capacity insert (default: 20)
    /// - `CACHE_TTL` - Banner TTL in seconds (default: 300)
    /// - `EVICTION_BACKPRESSURE` - `block`, `drop` or `deferred` (default: deferred)
    /// - `EVICTION_CHANNEL_CAPACITY` - Eviction channel bound (default: 1024)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `BANNER_SEED_FILE` - Path to a JSON array of banners (default: unset)
    ///
    /// Unparseable numbers fall back to their defaults. An unknown
    /// backpressure policy or an inconsistent cache sizing is an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let eviction_backpressure = match env::var("EVICTION_BACKPRESSURE") {
            Ok(value) => value.parse()?,
            Err(_) => defaults.eviction_backpressure,
        };

        let config = Self {
            cache_capacity: env_or("CACHE_CAPACITY", defaults.cache_capacity),
            eviction_batch_size: env_or("EVICTION_BATCH_SIZE", defaults.eviction_batch_size),
            cache_ttl: env_or("CACHE_TTL", defaults.cache_ttl),
            eviction_backpressure,
            eviction_channel_capacity: env_or(
                "EVICTION_CHANNEL_CAPACITY",
                defaults.eviction_channel_capacity,
            ),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            banner_seed_file: env::var_os("BANNER_SEED_FILE").map(PathBuf::from),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks the cache sizing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_sizing(self.cache_capacity, self.eviction_batch_size)
    }

    /// Banner TTL as a Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }
}

fn env_or<T: FromStr>(var: &str, default: T) -> T {
    env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_capacity: 1000,
            eviction_batch_size: 20,
            cache_ttl: 300,
            eviction_backpressure: BackpressurePolicy::Deferred,
            eviction_channel_capacity: 1024,
            server_port: 3000,
            banner_seed_file: None,
        }
    }
}
