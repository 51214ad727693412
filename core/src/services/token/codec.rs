//! Claims codec: signs claims into tokens and verifies tokens back into claims

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use ts_shared::config::JwtConfig;

use crate::domain::entities::claims::{ClaimValue, Claims, CLAIM_EXP, CLAIM_ID, CLAIM_ROLE_ID};
use crate::domain::entities::token::{Identity, Token, BEARER_PREFIX};
use crate::errors::{DomainError, TokenError};

/// Signing and verification capability consumed by the token service
pub trait TokenCodec: Send + Sync {
    /// Signs a claim set into an opaque token
    fn sign(&self, claims: &Claims) -> Result<Token, TokenError>;

    /// Verifies a token (optionally `Bearer `-prefixed) and returns its claims
    fn verify(&self, token: &str) -> Result<Claims, TokenError>;

    /// Verifies a token and extracts the identity it was issued for
    ///
    /// A token that verifies but lacks a textual `id` or `role_id` fails
    /// with [`TokenError::MissingClaim`], never with an invalid-token error.
    fn extract_identity(&self, token: &str) -> Result<Identity, TokenError> {
        let claims = self.verify(token)?;
        identity_from_claims(&claims)
    }
}

impl<C: TokenCodec + ?Sized> TokenCodec for Arc<C> {
    fn sign(&self, claims: &Claims) -> Result<Token, TokenError> {
        (**self).sign(claims)
    }

    fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        (**self).verify(token)
    }

    fn extract_identity(&self, token: &str) -> Result<Identity, TokenError> {
        (**self).extract_identity(token)
    }
}

/// Pulls the identity pair out of verified claims
///
/// `id` is checked before `role_id`.
pub fn identity_from_claims(claims: &Claims) -> Result<Identity, TokenError> {
    let id = claims
        .id()
        .ok_or_else(|| TokenError::missing_claim(CLAIM_ID))?;
    let role_id = claims
        .role_id()
        .ok_or_else(|| TokenError::missing_claim(CLAIM_ROLE_ID))?;
    Ok(Identity::new(id, role_id))
}

/// Process-wide HMAC secret, loaded once and never rotated
#[derive(Clone)]
pub struct SigningSecret(Arc<[u8]>);

impl SigningSecret {
    /// Wraps the secret bytes
    ///
    /// # Errors
    ///
    /// [`TokenError::MissingSecret`] if `bytes` is empty
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, TokenError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(TokenError::MissingSecret);
        }
        Ok(Self(bytes.into()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret(<redacted>)")
    }
}

/// HS256 JWT implementation of [`TokenCodec`]
pub struct JwtCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtCodec {
    /// Creates a codec bound to `secret`
    pub fn new(secret: SigningSecret) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        // `exp` is enforced when present but not required
        validation.required_spec_claims = HashSet::new();

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Creates a codec from the shared JWT configuration
    ///
    /// # Errors
    ///
    /// * `DomainError::Configuration` - unsupported algorithm
    /// * `DomainError::Token(MissingSecret)` - empty secret
    pub fn from_config(config: &JwtConfig) -> Result<Self, DomainError> {
        if !config.algorithm.eq_ignore_ascii_case("HS256") {
            return Err(DomainError::Configuration {
                message: format!("unsupported JWT algorithm: {}", config.algorithm),
            });
        }
        let secret = SigningSecret::new(config.secret.as_bytes())?;
        Ok(Self::new(secret))
    }
}

impl fmt::Debug for JwtCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtCodec")
            .field("algorithm", &Algorithm::HS256)
            .finish_non_exhaustive()
    }
}

impl TokenCodec for JwtCodec {
    fn sign(&self, claims: &Claims) -> Result<Token, TokenError> {
        let header = Header::new(Algorithm::HS256);
        encode(&header, claims, &self.encoding_key)
            .map(Token::new)
            .map_err(|e| TokenError::SigningFailed {
                reason: e.to_string(),
            })
    }

    fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let raw = strip_bearer(token);
        let token_data = decode::<Claims>(raw, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::ExpiredSignature => TokenError::TokenExpired,
                _ => TokenError::InvalidTokenFormat,
            })?;
        check_expiry(&token_data.claims)?;
        Ok(token_data.claims)
    }
}

/// Enforces `exp` on decoded claims
///
/// jsonwebtoken only checks `exp` values that fit an unsigned integer, so
/// negative and non-numeric values are handled here.
fn check_expiry(claims: &Claims) -> Result<(), TokenError> {
    match claims.get(CLAIM_EXP) {
        None => Ok(()),
        Some(ClaimValue::Integer(_) | ClaimValue::Float(_)) => {
            if claims.is_expired() {
                Err(TokenError::TokenExpired)
            } else {
                Ok(())
            }
        }
        Some(_) => Err(TokenError::InvalidTokenFormat),
    }
}

/// Removes an optional leading `Bearer ` from a presented token
pub fn strip_bearer(token: &str) -> &str {
    let token = token.trim();
    token.strip_prefix(BEARER_PREFIX).unwrap_or(token)
}
