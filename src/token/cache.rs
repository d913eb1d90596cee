//! Token Cache
//!
//! Expiry-aware reuse of stored tokens keyed by
//! `(environment, audience, scope)`. Purging is sweep-on-access: every
//! freshness read removes already-expired entries first; there is no
//! background timer.

use std::sync::Arc;

use crate::error::TokenResult;
use crate::token::store::CredentialStore;
use crate::types::{cache_key, StoredToken};

/// Margin before actual expiry at which a cached token is already treated
/// as unusable.
pub const EXPIRY_SAFETY_BUFFER_SECS: i64 = 60;

/// Cache façade over the store's token map.
pub struct TokenCache<S> {
    store: Arc<S>,
}

impl<S: CredentialStore> TokenCache<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Drop every entry whose expiry has passed; returns the removed count.
    pub async fn purge_expired(&self) -> TokenResult<u32> {
        let removed = self.store.remove_expired_tokens().await?;
        if removed > 0 {
            tracing::debug!(removed, "purged expired tokens");
        }
        Ok(removed)
    }

    /// Return a usable cached token for the triple, if any.
    ///
    /// Purges first, then requires expiry to be more than the safety buffer
    /// away; an entry inside the buffer is a miss even though not yet purged.
    pub async fn lookup(
        &self,
        environment: &str,
        audience: &str,
        scope: &str,
    ) -> TokenResult<Option<StoredToken>> {
        self.purge_expired().await?;

        let tokens = self.store.stored_tokens().await?;
        let key = cache_key(environment, audience, scope);
        Ok(tokens
            .get(&key)
            .filter(|token| token.is_usable(EXPIRY_SAFETY_BUFFER_SECS))
            .cloned())
    }

    /// Write/overwrite the entry under its computed key.
    pub async fn store(&self, token: &StoredToken) -> TokenResult<()> {
        self.store.store_token(token).await
    }
}
