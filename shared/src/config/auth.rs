//! Token signing configuration

use serde::{Deserialize, Serialize};

/// Secret used when `JWT_SECRET` is not provided
pub const DEFAULT_DEV_SECRET: &str = "development-secret-please-change-in-production";

/// JWT signing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Shared HMAC secret for signing and verifying tokens
    pub secret: String,

    /// Lifetime of freshly signed tokens in seconds
    #[serde(default = "default_sign_ttl")]
    pub sign_ttl_seconds: u64,

    /// How long verified claims stay cached, in seconds
    #[serde(default = "default_claims_ttl")]
    pub claims_ttl_seconds: u64,

    /// Algorithm for JWT signing (only HS256 is supported)
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::from(DEFAULT_DEV_SECRET),
            sign_ttl_seconds: default_sign_ttl(),
            claims_ttl_seconds: default_claims_ttl(),
            algorithm: default_algorithm(),
        }
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET")
            .unwrap_or_else(|_| DEFAULT_DEV_SECRET.to_string());
        let sign_ttl_seconds = std::env::var("JWT_SIGN_TTL")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_sign_ttl);
        let claims_ttl_seconds = std::env::var("JWT_CLAIMS_TTL")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_claims_ttl);

        Self {
            secret,
            sign_ttl_seconds,
            claims_ttl_seconds,
            algorithm: default_algorithm(),
        }
    }

    /// Set the signed token lifetime in hours
    pub fn with_sign_ttl_hours(mut self, hours: u64) -> Self {
        self.sign_ttl_seconds = hours * 3600;
        self
    }

    /// Set the verified claims cache lifetime in minutes
    pub fn with_claims_ttl_minutes(mut self, minutes: u64) -> Self {
        self.claims_ttl_seconds = minutes * 60;
        self
    }

    /// Check if using default secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == DEFAULT_DEV_SECRET
    }
}

fn default_sign_ttl() -> u64 {
    10800 // 3 hours
}

fn default_claims_ttl() -> u64 {
    900 // 15 minutes
}

fn default_algorithm() -> String {
    String::from("HS256")
}
