//! In-memory caching of signed tokens and verified claims.

mod token_cache;

#[cfg(test)]
mod tests;

pub use token_cache::{
    CacheEntry, CacheKey, CacheStats, CachedClaims, CachedToken, TokenCache, MAX_CLAIMS_TTL,
};
