//! Domain entities representing claims, tokens and identities.

pub mod claims;
pub mod token;


// Re-export commonly used types
pub use claims::{ClaimValue, Claims, CLAIM_EXP, CLAIM_ID, CLAIM_ROLE_ID};
pub use token::{fingerprint, Identity, Token, BEARER_PREFIX};
