//! Business services containing the token lifecycle.

pub mod token;

// Re-export commonly used types
pub use token::{
    ExpirySweeper, JwtCodec, SigningSecret, SweepReport, SweeperConfig, SweeperHandle,
    TokenCodec, TokenService, TokenServiceConfig,
};
