//! Fluent builders.

pub mod credentials;

pub use credentials::{credentials, CredentialsBuilder};
