//! In-process token cache
//!
//! Two independent key spaces live here, each in its own sharded map:
//! - the sign cache, keyed by [`Identity`], holding previously signed tokens
//! - the verify cache, keyed by the raw presented token string, holding the
//!   identity extracted from it together with a monotonic expiry
//!
//! Every operation takes at most one shard lock, for the duration of a single
//! map call. No guard ever escapes a method, so callers can never hold a lock
//! across a codec call or a visitor.

use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::time::Instant;
use tracing::debug;

use crate::domain::entities::token::{fingerprint, Identity, Token};

/// Upper bound on how long verified claims are kept
pub const MAX_CLAIMS_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// A previously signed token and the expiry embedded in it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedToken {
    pub token: Token,
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    /// Whether the embedded `exp` has passed
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Second granularity, same boundary as
    /// [`Claims::is_expired_at`](crate::domain::entities::claims::Claims::is_expired_at)
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.timestamp() < now.timestamp()
    }
}

/// Identity extracted from a verified token, valid until `expires_at`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedClaims {
    pub identity: Identity,
    pub expires_at: Instant,
}

impl CachedClaims {
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Key of a cache entry, tagged by key space
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Identity(Identity),
    Token(String),
}

/// Value of a cache entry, tagged by key space
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEntry {
    Token(CachedToken),
    Claims(CachedClaims),
}

/// Entry counts per key space
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub signed_tokens: usize,
    pub verified_claims: usize,
}

/// Concurrent cache shared by the token service and the expiry sweeper
#[derive(Debug, Default)]
pub struct TokenCache {
    signed: DashMap<Identity, CachedToken>,
    verified: DashMap<String, CachedClaims>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the token cached for `key`
    ///
    /// The embedded expiry is not checked here.
    pub fn lookup_token(&self, key: &Identity) -> Option<CachedToken> {
        self.signed.get(key).map(|entry| entry.value().clone())
    }

    /// Stores a signed token, replacing any previous one for `key`
    pub fn store_token(&self, key: Identity, token: Token, expires_at: DateTime<Utc>) {
        self.signed.insert(key, CachedToken { token, expires_at });
    }

    /// Removes the token cached for `key`, returning whether one existed
    pub fn delete_token(&self, key: &Identity) -> bool {
        self.signed.remove(key).is_some()
    }

    /// Returns the cached identity for a presented token if still valid
    ///
    /// An entry whose expiry has been reached is treated as absent and is
    /// removed on the way out. The removal only happens if the entry is still
    /// expired at that point, so a concurrent refresh is never lost.
    pub fn lookup_claims(&self, key: &str) -> Option<CachedClaims> {
        let now = Instant::now();
        match self.verified.get(key) {
            None => return None,
            Some(entry) if !entry.is_expired_at(now) => return Some(entry.value().clone()),
            Some(_) => {}
        }

        if self.remove_expired_claims(key, now) {
            debug!(token = %fingerprint(key), "Evicted expired claims on read");
        }
        None
    }

    /// Caches the identity extracted from `key` for `ttl`
    ///
    /// `ttl` is capped at [`MAX_CLAIMS_TTL`].
    pub fn store_claims(&self, key: impl Into<String>, identity: Identity, ttl: Duration) {
        let expires_at = Instant::now() + ttl.min(MAX_CLAIMS_TTL);
        self.verified
            .insert(key.into(), CachedClaims { identity, expires_at });
    }

    /// Removes the claims cached for `key`, returning whether they existed
    pub fn delete_claims(&self, key: &str) -> bool {
        self.verified.remove(key).is_some()
    }

    /// Removes the claims for `key` only if they are expired at `now`
    pub fn remove_expired_claims(&self, key: &str, now: Instant) -> bool {
        self.verified
            .remove_if(key, |_, entry| entry.is_expired_at(now))
            .is_some()
    }

    /// Visits a point-in-time snapshot of every entry
    ///
    /// The snapshot is taken before the first call to `visitor`, so the
    /// visitor may freely read or mutate the cache.
    pub fn for_each<F>(&self, mut visitor: F)
    where
        F: FnMut(&CacheKey, &CacheEntry),
    {
        let snapshot: Vec<(CacheKey, CacheEntry)> = self
            .signed
            .iter()
            .map(|e| {
                (
                    CacheKey::Identity(e.key().clone()),
                    CacheEntry::Token(e.value().clone()),
                )
            })
            .chain(self.verified.iter().map(|e| {
                (
                    CacheKey::Token(e.key().clone()),
                    CacheEntry::Claims(e.value().clone()),
                )
            }))
            .collect();

        for (key, entry) in &snapshot {
            visitor(key, entry);
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            signed_tokens: self.signed.len(),
            verified_claims: self.verified.len(),
        }
    }

    /// Total number of entries across both key spaces
    pub fn len(&self) -> usize {
        self.signed.len() + self.verified.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.signed.clear();
        self.verified.clear();
    }
}
