//! Token cache configuration module

use serde::{Deserialize, Serialize};

/// In-process token cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenCacheConfig {
    /// How often the background sweeper scans for expired entries (seconds)
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,

    /// Whether to run the background sweeper at all
    #[serde(default = "default_sweeper_enabled")]
    pub sweeper_enabled: bool,
}

impl Default for TokenCacheConfig {
    fn default() -> Self {
        Self {
            sweep_interval_seconds: default_sweep_interval(),
            sweeper_enabled: default_sweeper_enabled(),
        }
    }
}

impl TokenCacheConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let sweep_interval_seconds = std::env::var("TOKEN_CACHE_SWEEP_INTERVAL")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_sweep_interval);
        let sweeper_enabled = std::env::var("TOKEN_CACHE_SWEEPER_ENABLED")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_sweeper_enabled);

        Self {
            sweep_interval_seconds,
            sweeper_enabled,
        }
    }

    /// Set the sweep interval in seconds
    pub fn with_sweep_interval(mut self, seconds: u64) -> Self {
        self.sweep_interval_seconds = seconds;
        self
    }
}

fn default_sweep_interval() -> u64 {
    600 // 10 minutes
}

fn default_sweeper_enabled() -> bool {
    true
}
