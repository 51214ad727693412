//! Token error types
//!
//! Every failure of the token lifecycle falls into one of three classes
//! (see [`ErrorCategory`]). Callers branch on the class. The variant carries
//! the precise reason.

use thiserror::Error;

/// Coarse classification of a [`TokenError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The token could not be produced (secret unavailable, serialization failure)
    Signing,
    /// The presented token is unusable (bad signature, malformed, expired)
    InvalidToken,
    /// The token is validly signed but lacks a required identity claim
    MissingClaim,
}

/// Token-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Signing secret is empty or unavailable")]
    MissingSecret,

    #[error("Token signing failed: {reason}")]
    SigningFailed { reason: String },

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Invalid token format")]
    InvalidTokenFormat,

    #[error("Token expired")]
    TokenExpired,

    #[error("Missing claim: {claim}")]
    MissingClaim { claim: String },
}

impl TokenError {
    /// Error class of this failure
    pub fn category(&self) -> ErrorCategory {
        match self {
            TokenError::MissingSecret | TokenError::SigningFailed { .. } => ErrorCategory::Signing,
            TokenError::InvalidSignature
            | TokenError::InvalidTokenFormat
            | TokenError::TokenExpired => ErrorCategory::InvalidToken,
            TokenError::MissingClaim { .. } => ErrorCategory::MissingClaim,
        }
    }

    /// Shorthand for `category() == ErrorCategory::InvalidToken`
    pub fn is_invalid_token(&self) -> bool {
        self.category() == ErrorCategory::InvalidToken
    }

    /// Shorthand for `category() == ErrorCategory::MissingClaim`
    pub fn is_missing_claim(&self) -> bool {
        self.category() == ErrorCategory::MissingClaim
    }

    pub(crate) fn missing_claim(claim: &str) -> Self {
        TokenError::MissingClaim {
            claim: claim.to_string(),
        }
    }
}
