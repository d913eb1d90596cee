//! tokensmith
//!
//! Named-environment OAuth2 client-credentials token acquisition with
//! expiry-aware caching. Built as the core of an editor-plugin product: the
//! UI front end, the platform secret store and `.env` preprocessing are
//! external collaborators reached through the traits and free functions
//! exported here.
//!
//! # Features
//!
//! - Client Credentials Grant (RFC 6749 Section 4.4) against Auth0, Okta,
//!   Azure AD or any custom token endpoint
//! - Per-environment auth transmission style (`body`/`basic`), content type,
//!   custom headers and custom body fields
//! - `${VAR}` placeholder resolution against the process environment
//! - Token cache keyed by `(environment, audience, scope)` with a 60-second
//!   expiry safety buffer and sweep-on-access purging
//! - Classified failure reports with remediation hints
//! - Masked environment export and tolerant import
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tokensmith::{credentials, AcquireOptions, AuthMethod, Environment,
//!     InMemoryCredentialStore, TokenService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(InMemoryCredentialStore::new());
//!     let service = TokenService::with_default_transport(store);
//!
//!     let creds = credentials()
//!         .provider("auth0")
//!         .token_endpoint("https://${TENANT}.auth0.com/oauth/token")
//!         .client_id("${CLIENT_ID}")
//!         .client_secret("${CLIENT_SECRET}")
//!         .audience("https://api.example.com")
//!         .auth_method(AuthMethod::Body)
//!         .build()?;
//!     service.store().save_environment(&Environment::new("dev", creds)).await?;
//!
//!     let acquired = service.acquire(AcquireOptions::default()).await?;
//!     println!("bearer {} (cached: {})", acquired.token, acquired.from_cache);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `types`: credential, environment, token and boundary request types
//! - `error`: error hierarchy plus the human-readable failure report
//! - `core`: placeholder resolution, HTTP transport, env-file preprocessing
//! - `flows`: client-credentials request building and transport flow
//! - `token`: the storage collaborator trait and the expiry-aware cache
//! - `transfer`: masked export / tolerant import of environments
//! - `builders`: fluent credentials construction
//! - `client`: the `TokenService` orchestration and UI boundary

pub mod builders;
pub mod client;
pub mod core;
pub mod error;
pub mod flows;
pub mod token;
pub mod transfer;
pub mod types;

// Re-export the service
pub use client::{AcquireOptions, TokenService};

// Re-export builders
pub use builders::{credentials, CredentialsBuilder};

// Re-export errors
pub use error::{
    failure_report, provider_rejection, ConfigError, ImportError, NetworkError, ProtocolError,
    ProviderRejection, RequestSummary, StorageError, TokenError, TokenResult,
};

// Re-export types
pub use types::{
    cache_key, AcquiredToken, AuthMethod, ConfigRequest, ConfigResponse, ContentType, Credentials,
    CustomField, Environment, ResolvedCredentials, StoredToken, TokenResponse, PROVIDER_NONE,
};

// Re-export core components
pub use core::{
    load_env_files, resolve, resolve_credentials, resolve_with, HttpRequest, HttpResponse,
    HttpTransport, MockHttpTransport, ReqwestHttpTransport, Resolution, DEFAULT_TIMEOUT,
    ENV_FILE_NAMES,
};

// Re-export flows
pub use flows::{
    build_token_request, ClientCredentialsFlow, MockTokenFlow, TokenFlow, TokenRequest,
};

// Re-export token storage and cache
pub use token::{
    CredentialStore, InMemoryCredentialStore, MockCredentialStore, TokenCache,
    EXPIRY_SAFETY_BUFFER_SECS,
};

// Re-export transfer
pub use transfer::{export_environments, import_environments, ImportSummary, MASKED_SECRET};
