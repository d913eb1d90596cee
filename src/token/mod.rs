//! Token persistence: the storage collaborator and the expiry-aware cache.

pub mod cache;
pub mod store;

pub use cache::{TokenCache, EXPIRY_SAFETY_BUFFER_SECS};
pub use store::{CredentialStore, InMemoryCredentialStore, MockCredentialStore};
