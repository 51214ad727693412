//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `auth` - Token signing secret and lifetimes
//! - `cache` - In-process token cache and expiry sweeper
//! - `environment` - Environment detection and logging configuration

pub mod auth;
pub mod cache;
pub mod environment;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use auth::JwtConfig;
pub use cache::TokenCacheConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    #[serde(default)]
    pub environment: Environment,

    /// Token signing configuration
    pub jwt: JwtConfig,

    /// Token cache configuration
    #[serde(default)]
    pub cache: TokenCacheConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            jwt: JwtConfig::default(),
            cache: TokenCacheConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment
    ///
    /// `LOG_LEVEL` overrides the per-environment logging level.
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        let mut logging = LoggingConfig::for_environment(environment);
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            logging.level = level;
        }

        Self {
            environment,
            jwt: JwtConfig::from_env(),
            cache: TokenCacheConfig::from_env(),
            logging,
        }
    }
}
