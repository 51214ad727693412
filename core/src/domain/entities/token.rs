//! Signed token and the identity it carries.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Prefix accepted in front of a token (HTTP `Authorization` style)
pub const BEARER_PREFIX: &str = "Bearer ";

/// Opaque signed token string (`header.payload.signature`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Short, non-reversible tag for log lines
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.0)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Token> for String {
    fn from(token: Token) -> Self {
        token.0
    }
}

/// First 6 bytes of the SHA-256 of `raw`, hex encoded
///
/// Raw tokens are bearer credentials and never reach the logs.
pub fn fingerprint(raw: &str) -> String {
    let digest = Sha256::digest(raw.as_bytes());
    hex::encode(&digest[..6])
}

/// Identity extracted from (or signed into) a token
///
/// Also the key of the sign cache: the pair is hashed structurally, so
/// `("ab", "c")` and `("a", "bc")` never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub role_id: String,
}

impl Identity {
    pub fn new(id: impl Into<String>, role_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role_id: role_id.into(),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.id, self.role_id)
    }
}
