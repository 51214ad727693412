//! Claims carried inside a signed token.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Claim holding the subject identifier
pub const CLAIM_ID: &str = "id";

/// Claim holding the subject's role identifier
pub const CLAIM_ROLE_ID: &str = "role_id";

/// Claim holding the expiry as Unix seconds
pub const CLAIM_EXP: &str = "exp";

/// A single claim value
///
/// Timestamps are carried as `Integer` Unix seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClaimValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl ClaimValue {
    /// Returns the string payload if this is a textual claim
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ClaimValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as whole seconds if it is numeric
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ClaimValue::Integer(n) => Some(*n),
            ClaimValue::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            _ => None,
        }
    }
}

impl From<String> for ClaimValue {
    fn from(value: String) -> Self {
        ClaimValue::Text(value)
    }
}

impl From<&str> for ClaimValue {
    fn from(value: &str) -> Self {
        ClaimValue::Text(value.to_string())
    }
}

impl From<i64> for ClaimValue {
    fn from(value: i64) -> Self {
        ClaimValue::Integer(value)
    }
}

impl From<f64> for ClaimValue {
    fn from(value: f64) -> Self {
        ClaimValue::Float(value)
    }
}

impl From<bool> for ClaimValue {
    fn from(value: bool) -> Self {
        ClaimValue::Bool(value)
    }
}

impl From<DateTime<Utc>> for ClaimValue {
    fn from(value: DateTime<Utc>) -> Self {
        ClaimValue::Integer(value.timestamp())
    }
}

/// Claims structure for the JWT payload
///
/// Keys are kept sorted so the serialized payload is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(BTreeMap<String, ClaimValue>);

impl Claims {
    /// Creates an empty claim set
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the claim set issued for an identity
    ///
    /// # Arguments
    ///
    /// * `id` - Subject identifier
    /// * `role_id` - Subject role identifier
    /// * `expires_at` - Moment the token stops being valid
    pub fn for_identity(
        id: impl Into<String>,
        role_id: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        let id: String = id.into();
        let role_id: String = role_id.into();
        Self::new()
            .with(CLAIM_ID, id)
            .with(CLAIM_ROLE_ID, role_id)
            .with(CLAIM_EXP, expires_at)
    }

    /// Inserts a claim, returning the previous value under that key
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ClaimValue>,
    ) -> Option<ClaimValue> {
        self.0.insert(key.into(), value.into())
    }

    /// Builder-style variant of [`Claims::insert`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ClaimValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<ClaimValue> {
        self.0.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&ClaimValue> {
        self.0.get(key)
    }

    /// Returns the claim only if it is present and textual
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ClaimValue::as_str)
    }

    pub fn id(&self) -> Option<&str> {
        self.get_str(CLAIM_ID)
    }

    pub fn role_id(&self) -> Option<&str> {
        self.get_str(CLAIM_ROLE_ID)
    }

    /// Expiry carried by the `exp` claim, if any
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let secs = self.get(CLAIM_EXP)?.as_i64()?;
        Utc.timestamp_opt(secs, 0).single()
    }

    /// Checks whether the `exp` claim lies in the past
    ///
    /// Claims without `exp` never expire.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Checks the `exp` claim against `now`
    ///
    /// A token stays valid through the whole second named by `exp`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.get(CLAIM_EXP).and_then(ClaimValue::as_i64) {
            Some(exp) => exp < now.timestamp(),
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ClaimValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}
