//! Configuration for the token service

use std::time::Duration;

use ts_shared::config::JwtConfig;

/// Configuration for the token service
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// Lifetime of freshly signed tokens
    pub sign_ttl: Duration,
    /// How long verified claims stay cached
    pub claims_ttl: Duration,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            sign_ttl: Duration::from_secs(3 * 60 * 60),
            claims_ttl: Duration::from_secs(15 * 60),
        }
    }
}

impl From<&JwtConfig> for TokenServiceConfig {
    fn from(config: &JwtConfig) -> Self {
        Self {
            sign_ttl: Duration::from_secs(config.sign_ttl_seconds),
            claims_ttl: Duration::from_secs(config.claims_ttl_seconds),
        }
    }
}
