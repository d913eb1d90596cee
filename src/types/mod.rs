//! Core data types.

pub mod credentials;
pub mod requests;
pub mod token;

pub use credentials::{
    AuthMethod, ContentType, Credentials, CustomField, Environment, ResolvedCredentials,
    PROVIDER_NONE,
};
pub use requests::{ConfigRequest, ConfigResponse};
pub use token::{cache_key, AcquiredToken, StoredToken, TokenResponse};
