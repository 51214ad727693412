//! Unit tests for the token cache

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use tokio::time::{advance, Instant};

use crate::cache::{CacheEntry, CacheKey, CacheStats, CachedToken, TokenCache, MAX_CLAIMS_TTL};
use crate::domain::entities::claims::{Claims, CLAIM_EXP};
use crate::domain::entities::token::{Identity, Token};

const FIFTEEN_MINUTES: Duration = Duration::from_secs(15 * 60);

#[test]
fn test_store_and_lookup_token() {
    let cache = TokenCache::new();
    let key = Identity::new("u1", "admin");
    let exp = Utc::now() + chrono::Duration::hours(3);

    assert!(cache.lookup_token(&key).is_none());
    cache.store_token(key.clone(), Token::new("t1"), exp);

    let cached = cache.lookup_token(&key).unwrap();
    assert_eq!(cached.token, Token::new("t1"));
    assert_eq!(cached.expires_at, exp);
    assert!(!cached.is_expired());
}

#[test]
fn test_lookup_token_does_not_check_expiry() {
    let cache = TokenCache::new();
    let key = Identity::new("u1", "admin");
    cache.store_token(
        key.clone(),
        Token::new("stale"),
        Utc::now() - chrono::Duration::hours(1),
    );

    let cached = cache.lookup_token(&key).unwrap();
    assert!(cached.is_expired());
    assert_eq!(cached.token.as_str(), "stale");
}

#[test]
fn test_store_token_overwrites() {
    let cache = TokenCache::new();
    let key = Identity::new("u1", "admin");
    let exp = Utc::now() + chrono::Duration::hours(3);

    cache.store_token(key.clone(), Token::new("first"), exp);
    cache.store_token(key.clone(), Token::new("second"), exp);

    assert_eq!(cache.lookup_token(&key).unwrap().token.as_str(), "second");
    assert_eq!(cache.stats().signed_tokens, 1);
}

#[test]
fn test_delete_is_noop_when_absent() {
    let cache = TokenCache::new();
    assert!(!cache.delete_token(&Identity::new("nobody", "none")));
    assert!(!cache.delete_claims("missing"));

    cache.store_claims("tok", Identity::new("u1", "admin"), FIFTEEN_MINUTES);
    assert!(cache.delete_claims("tok"));
    assert!(cache.lookup_claims("tok").is_none());
}

#[tokio::test(start_paused = true)]
async fn test_claims_valid_until_ttl() {
    let cache = TokenCache::new();
    cache.store_claims("tok", Identity::new("u1", "admin"), FIFTEEN_MINUTES);

    advance(FIFTEEN_MINUTES - Duration::from_secs(1)).await;
    let cached = cache.lookup_claims("tok").unwrap();
    assert_eq!(cached.identity, Identity::new("u1", "admin"));
}

#[tokio::test(start_paused = true)]
async fn test_expired_claims_are_evicted_on_read() {
    let cache = TokenCache::new();
    cache.store_claims("tok", Identity::new("u1", "admin"), FIFTEEN_MINUTES);

    advance(FIFTEEN_MINUTES).await;
    assert!(cache.lookup_claims("tok").is_none());

    let mut seen = Vec::new();
    cache.for_each(|key, _| seen.push(key.clone()));
    assert!(seen.is_empty());
    assert_eq!(cache.stats(), CacheStats::default());
}

#[tokio::test(start_paused = true)]
async fn test_remove_expired_claims_keeps_fresh_entry() {
    let cache = TokenCache::new();
    let before = Instant::now();
    cache.store_claims("tok", Identity::new("u1", "admin"), FIFTEEN_MINUTES);

    assert!(!cache.remove_expired_claims("tok", before));
    assert!(cache.remove_expired_claims("tok", before + FIFTEEN_MINUTES));
    assert!(cache.is_empty());
}

#[test]
fn test_key_spaces_are_independent() {
    let cache = TokenCache::new();
    let exp = Utc::now() + chrono::Duration::hours(3);

    // a raw token string equal to the old concatenated identity key
    cache.store_token(Identity::new("u1", "admin"), Token::new("signed"), exp);
    cache.store_claims("u1admin", Identity::new("other", "user"), FIFTEEN_MINUTES);

    assert_eq!(
        cache.lookup_token(&Identity::new("u1", "admin")).unwrap().token.as_str(),
        "signed"
    );
    assert_eq!(
        cache.lookup_claims("u1admin").unwrap().identity,
        Identity::new("other", "user")
    );
    assert_eq!(
        cache.stats(),
        CacheStats {
            signed_tokens: 1,
            verified_claims: 1
        }
    );
}

#[test]
fn test_for_each_visits_snapshot_and_allows_mutation() {
    let cache = TokenCache::new();
    let exp = Utc::now() + chrono::Duration::hours(3);
    cache.store_token(Identity::new("u1", "admin"), Token::new("signed"), exp);
    for i in 0..50 {
        cache.store_claims(
            format!("tok-{i}"),
            Identity::new("u1", "admin"),
            FIFTEEN_MINUTES,
        );
    }

    let mut tokens = 0;
    let mut claims = 0;
    cache.for_each(|key, entry| {
        match (key, entry) {
            (CacheKey::Identity(id), CacheEntry::Token(_)) => {
                tokens += 1;
                cache.delete_token(id);
            }
            (CacheKey::Token(raw), CacheEntry::Claims(_)) => {
                claims += 1;
                cache.delete_claims(raw);
                // entries added mid-scan are not part of the snapshot
                cache.store_claims(
                    format!("{raw}-new"),
                    Identity::new("u2", "user"),
                    FIFTEEN_MINUTES,
                );
            }
            other => panic!("mismatched key space: {other:?}"),
        }
    });

    assert_eq!(tokens, 1);
    assert_eq!(claims, 50);
    assert_eq!(cache.stats().signed_tokens, 0);
    assert_eq!(cache.stats().verified_claims, 50);
}

#[test]
fn test_concurrent_stores_last_write_wins_without_tearing() {
    let cache = Arc::new(TokenCache::new());
    let writers = 8;
    let rounds = 200;

    thread::scope(|scope| {
        for w in 0..writers {
            let cache = Arc::clone(&cache);
            scope.spawn(move || {
                for r in 0..rounds {
                    let tag = format!("{w}-{r}");
                    cache.store_claims(
                        "shared",
                        Identity::new(format!("id-{tag}"), format!("role-{tag}")),
                        FIFTEEN_MINUTES,
                    );
                }
            });
        }
        for _ in 0..4 {
            let cache = Arc::clone(&cache);
            scope.spawn(move || {
                for _ in 0..rounds {
                    if let Some(entry) = cache.lookup_claims("shared") {
                        let id_tag = entry.identity.id.trim_start_matches("id-");
                        let role_tag = entry.identity.role_id.trim_start_matches("role-");
                        assert_eq!(id_tag, role_tag, "observed a torn entry");
                    }
                }
            });
        }
    });

    let winner = cache.lookup_claims("shared").unwrap();
    assert_eq!(
        winner.identity.id.trim_start_matches("id-"),
        winner.identity.role_id.trim_start_matches("role-")
    );
    assert_eq!(cache.stats().verified_claims, 1);
}

#[test]
fn test_clear() {
    let cache = TokenCache::new();
    cache.store_claims("tok", Identity::new("u1", "admin"), FIFTEEN_MINUTES);
    cache.store_token(Identity::new("u1", "admin"), Token::new("t"), Utc::now());
    assert_eq!(cache.len(), 2);

    cache.clear();
    assert!(cache.is_empty());
}

#[test]
fn test_cached_token_expires_with_its_claims() {
    let exp = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let cached = CachedToken {
        token: Token::new("t"),
        expires_at: exp,
    };
    let claims = Claims::new().with(CLAIM_EXP, exp);

    for offset_ms in [0, 500, 999, 1_000, 5_000] {
        let now = exp + chrono::Duration::milliseconds(offset_ms);
        assert_eq!(
            cached.is_expired_at(now),
            claims.is_expired_at(now),
            "boundary mismatch at +{offset_ms}ms"
        );
    }
    assert!(!cached.is_expired_at(exp));
    assert!(cached.is_expired_at(exp + chrono::Duration::seconds(1)));
}

#[tokio::test(start_paused = true)]
async fn test_store_claims_with_unbounded_ttl() {
    let cache = TokenCache::new();
    let before = Instant::now();
    cache.store_claims("tok", Identity::new("u1", "admin"), Duration::MAX);

    let cached = cache.lookup_claims("tok").unwrap();
    assert_eq!(cached.expires_at, before + MAX_CLAIMS_TTL);
    assert_eq!(cached.identity, Identity::new("u1", "admin"));
}
