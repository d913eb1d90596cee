//! Token Types
//!
//! Wire-level token response and the cached token record.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Token response from the provider's token endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct TokenResponse {
    /// Access token.
    pub access_token: String,
    /// Lifetime in seconds. Some providers omit it; one hour is assumed.
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
    /// Token type (usually "Bearer").
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Granted scopes.
    #[serde(default)]
    pub scope: Option<String>,
}

fn default_expires_in() -> u64 {
    3600
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Cache key for a `(environment, audience, scope)` triple.
///
/// Distinct audience/scope pairs for the same environment are distinct
/// entries, so one environment can hold tokens for several audiences.
pub fn cache_key(environment: &str, audience: &str, scope: &str) -> String {
    format!("{}-{}-{}", environment, audience, scope)
}

/// A cached bearer token with its absolute expiry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub environment: String,
    /// Audience the token was requested for; empty string if none.
    pub audience: String,
    /// Scope the token was requested for; empty string if none.
    pub scope: String,
}

impl StoredToken {
    /// Build a cache entry from a successful token response.
    pub fn from_response(
        environment: impl Into<String>,
        audience: impl Into<String>,
        scope: impl Into<String>,
        response: &TokenResponse,
    ) -> Self {
        Self {
            token: response.access_token.clone(),
            expires_at: Utc::now() + Duration::seconds(response.expires_in as i64),
            environment: environment.into(),
            audience: audience.into(),
            scope: scope.into(),
        }
    }

    pub fn cache_key(&self) -> String {
        cache_key(&self.environment, &self.audience, &self.scope)
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// Usable only while expiry is more than `buffer_secs` away.
    pub fn is_usable(&self, buffer_secs: i64) -> bool {
        self.expires_at > Utc::now() + Duration::seconds(buffer_secs)
    }

    /// Seconds until expiry, zero if already expired.
    pub fn remaining_lifetime(&self) -> i64 {
        let now = Utc::now();
        if self.expires_at > now {
            (self.expires_at - now).num_seconds()
        } else {
            0
        }
    }
}

/// Result of one acquisition: the token plus where it came from.
#[derive(Clone, Debug)]
pub struct AcquiredToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub environment: String,
    pub audience: String,
    pub scope: String,
    /// True when the token was served from the cache without a network call.
    pub from_cache: bool,
}

impl AcquiredToken {
    pub fn from_stored(stored: StoredToken, from_cache: bool) -> Self {
        Self {
            token: stored.token,
            expires_at: stored.expires_at,
            environment: stored.environment,
            audience: stored.audience,
            scope: stored.scope,
            from_cache,
        }
    }
}
