//! # Tokensmith Core
//!
//! Signs, verifies and decodes authentication tokens, with a short-lived
//! in-process cache in front of both directions:
//! - [`services::token::JwtCodec`] signs claims and verifies tokens
//! - [`cache::TokenCache`] remembers signed tokens and verified identities
//! - [`services::token::ExpirySweeper`] evicts expired cached claims
//! - [`services::token::TokenService`] ties them together for the HTTP layer

pub mod cache;
pub mod domain;
pub mod errors;
pub mod services;

// Re-export commonly used types for convenience
pub use cache::{CacheEntry, CacheKey, CacheStats, CachedClaims, CachedToken, TokenCache};
pub use domain::{ClaimValue, Claims, Identity, Token};
pub use errors::{DomainError, DomainResult, ErrorCategory, TokenError};
pub use services::{
    ExpirySweeper, JwtCodec, SigningSecret, SweepReport, SweeperConfig, SweeperHandle,
    TokenCodec, TokenService, TokenServiceConfig,
};
