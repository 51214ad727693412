//! Token service module
//!
//! This module handles all token-related operations including:
//! - HS256 JWT signing and verification
//! - Sign-or-fetch and verify-or-fetch through the shared token cache
//! - Background sweeping of expired cached claims

mod codec;
mod config;
mod service;
mod sweeper;


pub use codec::{identity_from_claims, strip_bearer, JwtCodec, SigningSecret, TokenCodec};
pub use config::TokenServiceConfig;
pub use service::TokenService;
pub use sweeper::{ExpirySweeper, SweepReport, SweeperConfig, SweeperHandle};
