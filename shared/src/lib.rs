//! Shared configuration types for Tokensmith
//!
//! This crate provides configuration used across the workspace:
//! - Token signing configuration (secret, lifetimes)
//! - Token cache and sweeper configuration
//! - Environment detection and logging configuration

pub mod config;

// Re-export commonly used items at crate root
pub use config::{AppConfig, Environment, JwtConfig, LogFormat, LoggingConfig, TokenCacheConfig};
