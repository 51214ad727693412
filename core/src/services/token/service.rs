//! Main token service implementation

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::debug;

use crate::cache::TokenCache;
use crate::domain::entities::claims::{Claims, CLAIM_ID, CLAIM_ROLE_ID};
use crate::domain::entities::token::{fingerprint, Identity, Token};
use crate::errors::TokenError;

use super::codec::TokenCodec;
use super::config::TokenServiceConfig;

/// Service combining a [`TokenCodec`] with the shared [`TokenCache`]
///
/// All methods take `&self` and are safe to call from any number of
/// concurrent tasks. The cache is never locked across a codec call.
pub struct TokenService<C: TokenCodec> {
    codec: C,
    cache: Arc<TokenCache>,
    config: TokenServiceConfig,
}

impl<C: TokenCodec> TokenService<C> {
    /// Creates a new token service with its own empty cache
    pub fn new(codec: C, config: TokenServiceConfig) -> Self {
        Self::with_cache(codec, Arc::new(TokenCache::new()), config)
    }

    /// Creates a token service on top of an existing cache
    pub fn with_cache(codec: C, cache: Arc<TokenCache>, config: TokenServiceConfig) -> Self {
        Self {
            codec,
            cache,
            config,
        }
    }

    /// Shared cache handle, used to drive the expiry sweeper
    pub fn cache(&self) -> &Arc<TokenCache> {
        &self.cache
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn config(&self) -> &TokenServiceConfig {
        &self.config
    }

    /// Returns a token for the identity, signing one only on a cache miss
    ///
    /// A cached token whose embedded expiry has passed counts as a miss: a
    /// fresh token is signed and replaces it.
    ///
    /// # Arguments
    ///
    /// * `id` - Subject identifier, must not be empty
    /// * `role_id` - Subject role identifier, must not be empty
    /// * `ttl` - Lifetime written into the `exp` claim of a new token
    ///
    /// # Returns
    ///
    /// * `Ok(Token)` - Cached or freshly signed token
    /// * `Err(TokenError::MissingClaim)` - Empty `id` or `role_id`
    /// * `Err(TokenError)` - Signing failed
    pub fn sign_or_cache(
        &self,
        id: &str,
        role_id: &str,
        ttl: Duration,
    ) -> Result<Token, TokenError> {
        if id.is_empty() {
            return Err(TokenError::missing_claim(CLAIM_ID));
        }
        if role_id.is_empty() {
            return Err(TokenError::missing_claim(CLAIM_ROLE_ID));
        }

        let key = Identity::new(id, role_id);
        if let Some(cached) = self.cache.lookup_token(&key) {
            if !cached.is_expired() {
                debug!(identity = %key, "Cache hit: returning cached token");
                return Ok(cached.token);
            }
            debug!(identity = %key, "Cached token has expired, signing a new one");
        }

        let lifetime = chrono::Duration::from_std(ttl).map_err(|_| TokenError::SigningFailed {
            reason: "token lifetime out of range".to_string(),
        })?;
        let expires_at = Utc::now()
            .checked_add_signed(lifetime)
            .ok_or_else(|| TokenError::SigningFailed {
                reason: "token expiry out of range".to_string(),
            })?;

        let claims = Claims::for_identity(id, role_id, expires_at);
        // `exp` has whole-second precision, keep the cache entry in step with it
        let expires_at = claims.expires_at().unwrap_or(expires_at);
        let token = self.codec.sign(&claims)?;

        debug!(identity = %key, token = %token.fingerprint(), "Signed new token");
        self.cache.store_token(key, token.clone(), expires_at);
        Ok(token)
    }

    /// [`TokenService::sign_or_cache`] with the configured lifetime
    pub fn sign_or_cache_default(&self, id: &str, role_id: &str) -> Result<Token, TokenError> {
        self.sign_or_cache(id, role_id, self.config.sign_ttl)
    }

    /// Returns the identity carried by `token`, verifying only on a cache miss
    ///
    /// The cache key is the token exactly as presented. On a miss the token is
    /// verified and its identity is cached for `ttl`. Errors from the codec are
    /// returned unchanged and nothing is cached for them.
    pub fn verify_or_cache_claims(
        &self,
        token: &str,
        ttl: Duration,
    ) -> Result<Identity, TokenError> {
        if let Some(cached) = self.cache.lookup_claims(token) {
            debug!(token = %fingerprint(token), "Cache hit: returning cached token claims");
            return Ok(cached.identity);
        }

        let identity = self.codec.extract_identity(token)?;
        self.cache.store_claims(token, identity.clone(), ttl);
        debug!(token = %fingerprint(token), identity = %identity, "Cached verified claims");
        Ok(identity)
    }

    /// [`TokenService::verify_or_cache_claims`] with the configured lifetime
    pub fn verify_or_cache_claims_default(&self, token: &str) -> Result<Identity, TokenError> {
        self.verify_or_cache_claims(token, self.config.claims_ttl)
    }

    /// Verifies a token and returns all of its claims, bypassing the cache
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.codec.verify(token)
    }
}
