//! Token Service
//!
//! High-level orchestration of one acquisition: resolve the active
//! environment, consult the cache, request on miss, store, return. Also the
//! validated boundary the configuration UI talks to. Strictly sequential;
//! a failed attempt is terminal until the caller triggers another.

use std::sync::Arc;

use crate::core::{resolve_credentials, ReqwestHttpTransport};
use crate::error::{failure_report, ConfigError, RequestSummary, TokenError, TokenResult};
use crate::flows::{ClientCredentialsFlow, TokenFlow};
use crate::token::{CredentialStore, TokenCache};
use crate::types::{
    AcquiredToken, ConfigRequest, ConfigResponse, Credentials, Environment, StoredToken,
};

/// Per-call inputs for one acquisition.
///
/// Audience/scope overrides take precedence over the environment's stored
/// defaults; a `Some("")` scope is an explicit empty scope.
#[derive(Clone, Debug, Default)]
pub struct AcquireOptions {
    /// Environment name; defaults to the current selection.
    pub environment: Option<String>,
    pub audience: Option<String>,
    pub scope: Option<String>,
}

/// Orchestrates environment resolution, caching and the token flow.
pub struct TokenService<S, F> {
    store: Arc<S>,
    cache: TokenCache<S>,
    flow: F,
}

impl<S: CredentialStore> TokenService<S, ClientCredentialsFlow<ReqwestHttpTransport>> {
    /// Service with the default reqwest transport.
    pub fn with_default_transport(store: Arc<S>) -> Self {
        let transport = Arc::new(ReqwestHttpTransport::new());
        Self::new(store, ClientCredentialsFlow::new(transport))
    }
}

impl<S: CredentialStore, F: TokenFlow> TokenService<S, F> {
    pub fn new(store: Arc<S>, flow: F) -> Self {
        let cache = TokenCache::new(store.clone());
        Self { store, cache, flow }
    }

    /// The underlying store, for callers wiring import/export or selection UI.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Acquire a bearer token, serving from the cache when a usable entry
    /// exists for the `(environment, audience, scope)` triple.
    pub async fn acquire(&self, options: AcquireOptions) -> TokenResult<AcquiredToken> {
        let environment = self
            .resolve_environment(options.environment.as_deref())
            .await?;
        let credentials = &environment.credentials;

        let audience = options
            .audience
            .clone()
            .or_else(|| credentials.audience.clone())
            .unwrap_or_default();
        let scope = options
            .scope
            .clone()
            .or_else(|| credentials.scope.clone())
            .unwrap_or_default();

        if let Some(cached) = self
            .cache
            .lookup(&environment.name, &audience, &scope)
            .await?
        {
            tracing::info!(
                environment = %environment.name,
                remaining = cached.remaining_lifetime(),
                "serving cached token"
            );
            return Ok(AcquiredToken::from_stored(cached, true));
        }

        let (resolved, _missing) = resolve_credentials(credentials);
        let response = self
            .flow
            .request_token(
                &resolved,
                options.audience.as_deref(),
                options.scope.as_deref(),
            )
            .await?;

        let stored = StoredToken::from_response(&environment.name, &audience, &scope, &response);
        self.cache.store(&stored).await?;
        tracing::info!(
            environment = %environment.name,
            expires_in = response.expires_in,
            "token acquired and cached"
        );
        Ok(AcquiredToken::from_stored(stored, false))
    }

    /// Make `name` the current environment, verifying it exists.
    pub async fn select_environment(&self, name: &str) -> TokenResult<()> {
        if self.store.environment(name).await?.is_none() {
            return Err(ConfigError::EnvironmentNotFound {
                name: name.to_string(),
            }
            .into());
        }
        self.store.set_current_environment(name).await
    }

    /// One-shot probe of a credentials record.
    pub async fn validate_credentials(&self, credentials: &Credentials) -> bool {
        let (resolved, _missing) = resolve_credentials(credentials);
        self.flow.request_token(&resolved, None, None).await.is_ok()
    }

    /// Handle one validated request from the configuration UI.
    pub async fn handle_config_request(
        &self,
        request: ConfigRequest,
    ) -> TokenResult<ConfigResponse> {
        match request {
            ConfigRequest::SaveCredentials { name, credentials } => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    return Err(TokenError::Config(ConfigError::MissingField {
                        field: "name".to_string(),
                    }));
                }
                let credentials = credentials.normalized();
                credentials.validate()?;
                self.store
                    .save_environment(&Environment::new(name.clone(), credentials))
                    .await?;
                Ok(ConfigResponse::Saved { name })
            }
            ConfigRequest::TestCredentials { credentials } => {
                let credentials = credentials.normalized();
                let (resolved, _missing) = resolve_credentials(&credentials);
                match self.flow.request_token(&resolved, None, None).await {
                    Ok(_) => Ok(ConfigResponse::TestResult {
                        success: true,
                        message: None,
                    }),
                    Err(error) => {
                        let summary = RequestSummary::from_credentials(&credentials, None);
                        Ok(ConfigResponse::TestResult {
                            success: false,
                            message: Some(failure_report(&error, &summary)),
                        })
                    }
                }
            }
            ConfigRequest::LoadEnvironments => Ok(ConfigResponse::Environments {
                environments: self.store.environments().await?,
                current: self.store.current_environment().await?,
            }),
            ConfigRequest::DeleteEnvironment { name } => {
                let removed = self.store.delete_environment(&name).await?;
                Ok(ConfigResponse::Deleted { name, removed })
            }
        }
    }

    /// Explicit name wins; then the current pointer; with neither, a single
    /// configured environment is auto-selected, anything else asks the user.
    async fn resolve_environment(&self, name: Option<&str>) -> TokenResult<Environment> {
        if let Some(name) = name {
            return self.store.environment(name).await?.ok_or_else(|| {
                ConfigError::EnvironmentNotFound {
                    name: name.to_string(),
                }
                .into()
            });
        }

        if let Some(current) = self.store.current_environment().await? {
            return match self.store.environment(&current).await? {
                Some(environment) => Ok(environment),
                None => Err(ConfigError::EnvironmentNotFound { name: current }.into()),
            };
        }

        let mut environments = self.store.environments().await?;
        match environments.len() {
            0 => Err(ConfigError::NoEnvironments.into()),
            1 => {
                let environment = environments.remove(0);
                self.store
                    .set_current_environment(&environment.name)
                    .await?;
                tracing::info!(
                    environment = %environment.name,
                    "auto-selected the only configured environment"
                );
                Ok(environment)
            }
            _ => Err(ConfigError::SelectionRequired {
                available: environments
                    .into_iter()
                    .map(|environment| environment.name)
                    .collect(),
            }
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::provider_rejection;
    use crate::flows::MockTokenFlow;
    use crate::token::InMemoryCredentialStore;
    use crate::types::TokenResponse;
    use chrono::{Duration, Utc};

    fn credentials() -> Credentials {
        Credentials {
            provider: "auth0".to_string(),
            token_endpoint: "https://dev.auth0.com/oauth/token".to_string(),
            client_id: "client-123".to_string(),
            client_secret: "secret".to_string(),
            audience: Some("https://api.x.com".to_string()),
            scope: Some("read".to_string()),
            ..Default::default()
        }
    }

    async fn service_with_envs(
        names: &[&str],
    ) -> TokenService<InMemoryCredentialStore, MockTokenFlow> {
        let store = Arc::new(InMemoryCredentialStore::new());
        for name in names {
            store
                .save_environment(&Environment::new(*name, credentials()))
                .await
                .unwrap();
        }
        TokenService::new(store, MockTokenFlow::new())
    }

    #[tokio::test]
    async fn test_no_environments_is_a_config_error() {
        let service = service_with_envs(&[]).await;
        let err = service.acquire(AcquireOptions::default()).await.unwrap_err();
        assert!(matches!(
            err,
            TokenError::Config(ConfigError::NoEnvironments)
        ));
    }

    #[tokio::test]
    async fn test_single_environment_auto_selected() {
        let service = service_with_envs(&["dev"]).await;
        let acquired = service.acquire(AcquireOptions::default()).await.unwrap();

        assert_eq!(acquired.environment, "dev");
        assert!(!acquired.from_cache);
        assert_eq!(
            service.store().current_environment().await.unwrap(),
            Some("dev".to_string())
        );
    }

    #[tokio::test]
    async fn test_multiple_environments_require_selection() {
        let service = service_with_envs(&["dev", "prod"]).await;
        let err = service.acquire(AcquireOptions::default()).await.unwrap_err();

        match err {
            TokenError::Config(ConfigError::SelectionRequired { available }) => {
                assert_eq!(available, vec!["dev", "prod"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stale_current_pointer_is_reported() {
        let service = service_with_envs(&["dev"]).await;
        service
            .store()
            .set_current_environment("gone")
            .await
            .unwrap();

        let err = service.acquire(AcquireOptions::default()).await.unwrap_err();
        assert!(matches!(
            err,
            TokenError::Config(ConfigError::EnvironmentNotFound { ref name }) if name == "gone"
        ));
    }

    #[tokio::test]
    async fn test_second_acquisition_served_from_cache() {
        let service = service_with_envs(&["dev"]).await;

        let first = service.acquire(AcquireOptions::default()).await.unwrap();
        assert!(!first.from_cache);

        let second = service.acquire(AcquireOptions::default()).await.unwrap();
        assert!(second.from_cache);
        assert_eq!(second.token, first.token);
        // Only the first call reached the flow.
        assert_eq!(service.flow.request_count(), 1);
    }

    #[tokio::test]
    async fn test_near_expiry_entry_triggers_fresh_request() {
        let service = service_with_envs(&["dev"]).await;
        service
            .store()
            .store_token(&StoredToken {
                token: "stale".to_string(),
                expires_at: Utc::now() + Duration::seconds(30),
                environment: "dev".to_string(),
                audience: "https://api.x.com".to_string(),
                scope: "read".to_string(),
            })
            .await
            .unwrap();

        let acquired = service.acquire(AcquireOptions::default()).await.unwrap();
        assert!(!acquired.from_cache);
        assert_ne!(acquired.token, "stale");
        assert_eq!(service.flow.request_count(), 1);
    }

    #[tokio::test]
    async fn test_overrides_reach_flow_and_key_cache_separately() {
        let service = service_with_envs(&["dev"]).await;

        service.acquire(AcquireOptions::default()).await.unwrap();
        service
            .acquire(AcquireOptions {
                audience: Some("https://other.api".to_string()),
                scope: Some("write".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        // Different triple -> second network request with the overrides.
        assert_eq!(
            service.flow.request_history(),
            vec![
                (None, None),
                (
                    Some("https://other.api".to_string()),
                    Some("write".to_string())
                ),
            ]
        );

        let tokens = service.store().stored_tokens().await.unwrap();
        assert!(tokens.contains_key("dev-https://api.x.com-read"));
        assert!(tokens.contains_key("dev-https://other.api-write"));
    }

    #[tokio::test]
    async fn test_provider_failure_propagates_without_storing() {
        let service = service_with_envs(&["dev"]).await;
        service.flow.queue_error(TokenError::Provider(provider_rejection(
            401,
            r#"{"error":"invalid_client"}"#,
        )));

        let err = service.acquire(AcquireOptions::default()).await.unwrap_err();
        assert!(matches!(err, TokenError::Provider(_)));
        assert!(service.store().stored_tokens().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_request_validates_before_store() {
        let service = service_with_envs(&[]).await;

        let mut invalid = credentials();
        invalid.client_secret = String::new();
        let err = service
            .handle_config_request(ConfigRequest::SaveCredentials {
                name: "dev".to_string(),
                credentials: invalid,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, TokenError::Config(_)));
        assert!(service.store().environments().await.unwrap().is_empty());

        let response = service
            .handle_config_request(ConfigRequest::SaveCredentials {
                name: "dev".to_string(),
                credentials: credentials(),
            })
            .await
            .unwrap();
        assert!(matches!(response, ConfigResponse::Saved { ref name } if name == "dev"));
    }

    #[tokio::test]
    async fn test_test_credentials_failure_returns_report() {
        let service = service_with_envs(&[]).await;
        service.flow.queue_error(TokenError::Provider(provider_rejection(
            401,
            r#"{"error":"invalid_client","error_description":"bad secret"}"#,
        )));

        let response = service
            .handle_config_request(ConfigRequest::TestCredentials {
                credentials: credentials(),
            })
            .await
            .unwrap();

        match response {
            ConfigResponse::TestResult { success, message } => {
                assert!(!success);
                let message = message.unwrap();
                assert!(message.contains("invalid_client"));
                assert!(message.contains("bad secret"));
                assert!(message.contains("Request details:"));
            }
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_load_and_delete_requests() {
        let service = service_with_envs(&["dev", "prod"]).await;
        service.select_environment("prod").await.unwrap();

        let response = service
            .handle_config_request(ConfigRequest::LoadEnvironments)
            .await
            .unwrap();
        match response {
            ConfigResponse::Environments {
                environments,
                current,
            } => {
                assert_eq!(environments.len(), 2);
                assert_eq!(current, Some("prod".to_string()));
            }
            other => panic!("unexpected response: {:?}", other),
        }

        let response = service
            .handle_config_request(ConfigRequest::DeleteEnvironment {
                name: "prod".to_string(),
            })
            .await
            .unwrap();
        assert!(matches!(
            response,
            ConfigResponse::Deleted { removed: true, .. }
        ));
        assert_eq!(service.store().current_environment().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_select_environment_requires_existing_name() {
        let service = service_with_envs(&["dev"]).await;
        assert!(service.select_environment("dev").await.is_ok());
        assert!(service.select_environment("missing").await.is_err());
    }
}
