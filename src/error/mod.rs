//! Error Types
//!
//! Error hierarchy for configuration, transport, provider, storage and
//! import failures, plus the human-readable failure report.

use std::time::Duration;

use thiserror::Error;

mod report;

pub use report::{failure_report, RequestSummary};

/// Root error type for token acquisition.
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderRejection),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Import error: {0}")]
    Import(#[from] ImportError),
}

impl TokenError {
    /// Short code for log lines.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::Network(_) => "NETWORK",
            Self::Provider(_) => "PROVIDER",
            Self::Protocol(_) => "PROTOCOL",
            Self::Storage(_) => "STORAGE",
            Self::Import(_) => "IMPORT",
        }
    }

    /// Whether the failure is a local configuration problem, recoverable by
    /// prompting the user rather than reporting a request failure.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

/// Configuration error.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid token endpoint URL: {url}")]
    InvalidEndpoint { url: String },

    #[error("No environments configured")]
    NoEnvironments,

    #[error("Environment '{name}' not found")]
    EnvironmentNotFound { name: String },

    #[error("Multiple environments configured; select one of: {}", .available.join(", "))]
    SelectionRequired { available: Vec<String> },
}

/// Network/transport error.
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("DNS resolution failed for {host}")]
    DnsResolutionFailed { host: String },

    #[error("Request timed out after {timeout:?}")]
    Timeout { timeout: Duration },
}

/// Non-2xx response from the provider's token endpoint.
#[derive(Error, Debug, Clone)]
#[error("token request rejected (HTTP {status})")]
pub struct ProviderRejection {
    pub status: u16,
    /// Provider error code, e.g. `invalid_client`.
    pub error: Option<String>,
    /// Provider human description.
    pub error_description: Option<String>,
    /// Alternative message field some providers use instead.
    pub message: Option<String>,
}

impl ProviderRejection {
    /// Best available human detail from the provider body.
    pub fn detail(&self) -> Option<&str> {
        self.error_description
            .as_deref()
            .or(self.message.as_deref())
            .or(self.error.as_deref())
    }
}

/// Response parsing error.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Invalid JSON in response: {message}")]
    InvalidJson { message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },
}

/// Storage error.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Read failed: {message}")]
    ReadFailed { message: String },

    #[error("Write failed: {message}")]
    WriteFailed { message: String },
}

/// Environment import error.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Import payload is not valid JSON: {message}")]
    InvalidJson { message: String },

    #[error("Import payload must be a JSON array of environments")]
    NotAnArray,
}

/// Result type for token operations.
pub type TokenResult<T> = Result<T, TokenError>;

#[derive(Debug, Default, serde::Deserialize)]
struct ProviderErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Parse a provider error body, tolerating any or all fields being absent
/// (or the body not being JSON at all).
pub fn provider_rejection(status: u16, body: &str) -> ProviderRejection {
    let parsed: ProviderErrorBody = serde_json::from_str(body).unwrap_or_default();
    ProviderRejection {
        status,
        error: parsed.error,
        error_description: parsed.error_description,
        message: parsed.message,
    }
}
