//! Credential Storage
//!
//! The persistent store owning environments, the current-environment
//! pointer, and cached tokens. Credentials travel through a secure channel
//! modeled here as serialized JSON blobs keyed by environment name.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{StorageError, TokenError, TokenResult};
use crate::types::{Environment, StoredToken};

/// Storage interface the core requires.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Every stored environment, in insertion order.
    ///
    /// A malformed persisted credentials blob skips that single environment
    /// (logged); the rest of the list is still returned.
    async fn environments(&self) -> TokenResult<Vec<Environment>>;

    /// Upsert by name.
    async fn save_environment(&self, environment: &Environment) -> TokenResult<()>;

    /// Delete an environment. Cascades: every cached token whose
    /// `environment` matches is removed, and the current pointer is cleared
    /// if it referenced the deleted name. Returns whether it existed.
    async fn delete_environment(&self, name: &str) -> TokenResult<bool>;

    async fn current_environment(&self) -> TokenResult<Option<String>>;

    async fn set_current_environment(&self, name: &str) -> TokenResult<()>;

    async fn clear_current_environment(&self) -> TokenResult<()>;

    /// All cached tokens keyed by their cache key.
    async fn stored_tokens(&self) -> TokenResult<HashMap<String, StoredToken>>;

    /// Write/overwrite a token under its computed cache key.
    async fn store_token(&self, token: &StoredToken) -> TokenResult<()>;

    /// Remove every token whose expiry has passed; returns the removed count.
    async fn remove_expired_tokens(&self) -> TokenResult<u32>;

    /// Find one environment by name.
    async fn environment(&self, name: &str) -> TokenResult<Option<Environment>> {
        Ok(self
            .environments()
            .await?
            .into_iter()
            .find(|environment| environment.name == name))
    }
}

#[derive(Default)]
struct Inner {
    /// Environment names in insertion order.
    names: Vec<String>,
    /// name -> credentials JSON blob (the secure channel).
    secrets: HashMap<String, String>,
    current: Option<String>,
    tokens: HashMap<String, StoredToken>,
}

/// In-memory store implementation.
pub struct InMemoryCredentialStore {
    inner: Mutex<Inner>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Inject a raw credentials blob for an environment name, bypassing
    /// serialization. Lets tests exercise the malformed-entry tolerance.
    pub fn seed_credentials_json(&self, name: &str, json: &str) {
        let mut inner = self.inner.lock().unwrap();
        if !inner.names.iter().any(|n| n == name) {
            inner.names.push(name.to_string());
        }
        inner.secrets.insert(name.to_string(), json.to_string());
    }
}

impl Default for InMemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn environments(&self) -> TokenResult<Vec<Environment>> {
        let inner = self.inner.lock().unwrap();
        let mut environments = Vec::new();

        for name in &inner.names {
            let Some(blob) = inner.secrets.get(name) else {
                continue;
            };
            match serde_json::from_str(blob) {
                Ok(credentials) => environments.push(Environment {
                    name: name.clone(),
                    credentials,
                }),
                Err(err) => {
                    tracing::warn!(environment = %name, error = %err, "skipping malformed credentials entry");
                }
            }
        }

        Ok(environments)
    }

    async fn save_environment(&self, environment: &Environment) -> TokenResult<()> {
        let blob = serde_json::to_string(&environment.credentials).map_err(|e| {
            TokenError::Storage(StorageError::WriteFailed {
                message: e.to_string(),
            })
        })?;

        let mut inner = self.inner.lock().unwrap();
        if !inner.names.iter().any(|n| n == &environment.name) {
            inner.names.push(environment.name.clone());
        }
        inner.secrets.insert(environment.name.clone(), blob);
        Ok(())
    }

    async fn delete_environment(&self, name: &str) -> TokenResult<bool> {
        let mut inner = self.inner.lock().unwrap();
        let existed = inner.secrets.remove(name).is_some();
        inner.names.retain(|n| n != name);
        inner.tokens.retain(|_, token| token.environment != name);
        if inner.current.as_deref() == Some(name) {
            inner.current = None;
        }
        Ok(existed)
    }

    async fn current_environment(&self) -> TokenResult<Option<String>> {
        Ok(self.inner.lock().unwrap().current.clone())
    }

    async fn set_current_environment(&self, name: &str) -> TokenResult<()> {
        self.inner.lock().unwrap().current = Some(name.to_string());
        Ok(())
    }

    async fn clear_current_environment(&self) -> TokenResult<()> {
        self.inner.lock().unwrap().current = None;
        Ok(())
    }

    async fn stored_tokens(&self) -> TokenResult<HashMap<String, StoredToken>> {
        Ok(self.inner.lock().unwrap().tokens.clone())
    }

    async fn store_token(&self, token: &StoredToken) -> TokenResult<()> {
        self.inner
            .lock()
            .unwrap()
            .tokens
            .insert(token.cache_key(), token.clone());
        Ok(())
    }

    async fn remove_expired_tokens(&self) -> TokenResult<u32> {
        let mut inner = self.inner.lock().unwrap();
        let initial = inner.tokens.len();
        inner.tokens.retain(|_, token| !token.is_expired());
        Ok((initial - inner.tokens.len()) as u32)
    }
}

/// Mock store for testing: in-memory behavior plus call history and failure
/// injection.
#[derive(Default)]
pub struct MockCredentialStore {
    environments: Mutex<Vec<Environment>>,
    current: Mutex<Option<String>>,
    tokens: Mutex<HashMap<String, StoredToken>>,
    save_history: Mutex<Vec<Environment>>,
    delete_history: Mutex<Vec<String>>,
    token_store_history: Mutex<Vec<StoredToken>>,
    next_error: Mutex<Option<TokenError>>,
    should_fail: Mutex<bool>,
}

impl MockCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every operation with a storage error.
    pub fn set_should_fail(&self, should_fail: bool) -> &Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    /// Fail only the next operation with the given error.
    pub fn set_next_error(&self, error: TokenError) -> &Self {
        *self.next_error.lock().unwrap() = Some(error);
        self
    }

    /// Pre-populate an environment.
    pub fn add_environment(&self, environment: Environment) -> &Self {
        self.environments.lock().unwrap().push(environment);
        self
    }

    /// Pre-populate a token.
    pub fn add_token(&self, token: StoredToken) -> &Self {
        self.tokens
            .lock()
            .unwrap()
            .insert(token.cache_key(), token);
        self
    }

    pub fn save_history(&self) -> Vec<Environment> {
        self.save_history.lock().unwrap().clone()
    }

    pub fn delete_history(&self) -> Vec<String> {
        self.delete_history.lock().unwrap().clone()
    }

    pub fn token_store_history(&self) -> Vec<StoredToken> {
        self.token_store_history.lock().unwrap().clone()
    }

    fn check_error(&self) -> TokenResult<()> {
        if *self.should_fail.lock().unwrap() {
            return Err(TokenError::Storage(StorageError::ReadFailed {
                message: "mock storage failure".to_string(),
            }));
        }
        if let Some(error) = self.next_error.lock().unwrap().take() {
            return Err(error);
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for MockCredentialStore {
    async fn environments(&self) -> TokenResult<Vec<Environment>> {
        self.check_error()?;
        Ok(self.environments.lock().unwrap().clone())
    }

    async fn save_environment(&self, environment: &Environment) -> TokenResult<()> {
        self.check_error()?;
        self.save_history.lock().unwrap().push(environment.clone());

        let mut environments = self.environments.lock().unwrap();
        match environments.iter_mut().find(|e| e.name == environment.name) {
            Some(existing) => *existing = environment.clone(),
            None => environments.push(environment.clone()),
        }
        Ok(())
    }

    async fn delete_environment(&self, name: &str) -> TokenResult<bool> {
        self.check_error()?;
        self.delete_history.lock().unwrap().push(name.to_string());

        let mut environments = self.environments.lock().unwrap();
        let initial = environments.len();
        environments.retain(|e| e.name != name);
        let existed = environments.len() < initial;

        self.tokens
            .lock()
            .unwrap()
            .retain(|_, token| token.environment != name);
        let mut current = self.current.lock().unwrap();
        if current.as_deref() == Some(name) {
            *current = None;
        }
        Ok(existed)
    }

    async fn current_environment(&self) -> TokenResult<Option<String>> {
        self.check_error()?;
        Ok(self.current.lock().unwrap().clone())
    }

    async fn set_current_environment(&self, name: &str) -> TokenResult<()> {
        self.check_error()?;
        *self.current.lock().unwrap() = Some(name.to_string());
        Ok(())
    }

    async fn clear_current_environment(&self) -> TokenResult<()> {
        self.check_error()?;
        *self.current.lock().unwrap() = None;
        Ok(())
    }

    async fn stored_tokens(&self) -> TokenResult<HashMap<String, StoredToken>> {
        self.check_error()?;
        Ok(self.tokens.lock().unwrap().clone())
    }

    async fn store_token(&self, token: &StoredToken) -> TokenResult<()> {
        self.check_error()?;
        self.token_store_history.lock().unwrap().push(token.clone());
        self.tokens
            .lock()
            .unwrap()
            .insert(token.cache_key(), token.clone());
        Ok(())
    }

    async fn remove_expired_tokens(&self) -> TokenResult<u32> {
        self.check_error()?;
        let mut tokens = self.tokens.lock().unwrap();
        let initial = tokens.len();
        tokens.retain(|_, token| !token.is_expired());
        Ok((initial - tokens.len()) as u32)
    }
}
