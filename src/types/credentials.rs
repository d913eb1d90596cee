//! Credential Types
//!
//! Per-environment provider connection details and auth preferences.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Provider label meaning "no specific provider selected".
pub const PROVIDER_NONE: &str = "none";

/// How client credentials are transmitted to the token endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthMethod {
    /// `client_id` and `client_secret` as body fields.
    Body,
    /// HTTP Basic Authentication header.
    Basic,
    /// Selectable in the UI, but requests are built exactly like `Body`.
    CustomJwt,
}

impl Default for AuthMethod {
    fn default() -> Self {
        Self::Body
    }
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Body => "body",
            Self::Basic => "basic",
            Self::CustomJwt => "custom-jwt",
        }
    }

    /// Whether the client id/secret travel as body fields.
    pub fn credentials_in_body(&self) -> bool {
        matches!(self, Self::Body | Self::CustomJwt)
    }
}

/// Request body encoding for the token request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentType {
    #[serde(rename = "application/json")]
    Json,
    #[serde(rename = "application/x-www-form-urlencoded")]
    FormUrlencoded,
}

impl Default for ContentType {
    fn default() -> Self {
        Self::Json
    }
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::FormUrlencoded => "application/x-www-form-urlencoded",
        }
    }
}

/// Ordered key/value pair for custom headers and custom body fields.
///
/// Values may contain `${VAR}` placeholders resolved at request time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomField {
    pub key: String,
    pub value: String,
}

impl CustomField {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Connection details and auth preferences for one environment.
///
/// Serde defaults are the single normalization point: a deserialized record
/// is fully populated and the rest of the crate never re-applies fallbacks.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    /// Provider label (free text). Empty or `"none"` relaxes required-field
    /// validation at the configuration boundary.
    #[serde(default)]
    pub provider: String,
    /// Token endpoint URL; may contain `${VAR}` placeholders.
    #[serde(default)]
    pub token_endpoint: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
    /// Space-separated scope string. An explicitly empty string is valid and
    /// distinct from an unspecified scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default)]
    pub auth_method: AuthMethod,
    #[serde(default)]
    pub content_type: ContentType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_headers: Vec<CustomField>,
    /// When non-empty these fields replace the standard OAuth body entirely.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_body: Vec<CustomField>,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            provider: String::new(),
            token_endpoint: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            audience: None,
            scope: None,
            auth_method: AuthMethod::default(),
            content_type: ContentType::default(),
            custom_headers: Vec::new(),
            custom_body: Vec::new(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("provider", &self.provider)
            .field("token_endpoint", &self.token_endpoint)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("audience", &self.audience)
            .field("scope", &self.scope)
            .field("auth_method", &self.auth_method)
            .field("content_type", &self.content_type)
            .field("custom_headers", &self.custom_headers)
            .field("custom_body", &self.custom_body)
            .finish()
    }
}

impl Credentials {
    /// Whether a concrete provider was selected (not empty, not "none").
    pub fn has_named_provider(&self) -> bool {
        !self.provider.trim().is_empty() && self.provider.trim() != PROVIDER_NONE
    }

    /// Trim incidental whitespace from the connection fields.
    pub fn normalized(mut self) -> Self {
        self.provider = self.provider.trim().to_string();
        self.token_endpoint = self.token_endpoint.trim().to_string();
        self.client_id = self.client_id.trim().to_string();
        self
    }

    /// Configuration-boundary validation.
    ///
    /// Endpoint, client id and client secret are required unless the provider
    /// label is empty/"none". The request builder independently requires a
    /// non-empty endpoint before any network attempt.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.has_named_provider() {
            return Ok(());
        }

        for (field, value) in [
            ("token_endpoint", &self.token_endpoint),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingField {
                    field: field.to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Credentials after placeholder resolution, ready for request building.
#[derive(Clone)]
pub struct ResolvedCredentials {
    pub provider: String,
    pub token_endpoint: String,
    pub client_id: String,
    pub client_secret: secrecy::SecretString,
    pub audience: Option<String>,
    pub scope: Option<String>,
    pub auth_method: AuthMethod,
    pub content_type: ContentType,
    pub custom_headers: Vec<(String, String)>,
    pub custom_body: Vec<(String, String)>,
}

impl std::fmt::Debug for ResolvedCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedCredentials")
            .field("provider", &self.provider)
            .field("token_endpoint", &self.token_endpoint)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("audience", &self.audience)
            .field("scope", &self.scope)
            .field("auth_method", &self.auth_method)
            .field("content_type", &self.content_type)
            .finish()
    }
}

/// A named, persisted bundle of credentials.
///
/// The name is the stable identifier and storage key; renaming is modeled as
/// delete-old + insert-new at the storage layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub name: String,
    pub credentials: Credentials,
}

impl Environment {
    pub fn new(name: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            name: name.into(),
            credentials,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_method_wire_names() {
        assert_eq!(
            serde_json::to_string(&AuthMethod::Body).unwrap(),
            "\"body\""
        );
        assert_eq!(
            serde_json::to_string(&AuthMethod::Basic).unwrap(),
            "\"basic\""
        );
        assert_eq!(
            serde_json::to_string(&AuthMethod::CustomJwt).unwrap(),
            "\"custom-jwt\""
        );
    }

    #[test]
    fn test_content_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&ContentType::FormUrlencoded).unwrap(),
            "\"application/x-www-form-urlencoded\""
        );
    }

    #[test]
    fn test_defaults_applied_on_deserialize() {
        let creds: Credentials = serde_json::from_str(
            r#"{"token_endpoint":"https://example.com/token","client_id":"id","client_secret":"s"}"#,
        )
        .unwrap();

        assert_eq!(creds.auth_method, AuthMethod::Body);
        assert_eq!(creds.content_type, ContentType::Json);
        assert!(creds.custom_headers.is_empty());
        assert!(creds.audience.is_none());
    }

    #[test]
    fn test_validate_requires_fields_for_named_provider() {
        let creds = Credentials {
            provider: "auth0".to_string(),
            token_endpoint: "https://example.com/token".to_string(),
            client_id: "id".to_string(),
            client_secret: String::new(),
            ..Default::default()
        };

        let err = creds.validate().unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { ref field } if field == "client_secret"));
    }

    #[test]
    fn test_validate_relaxed_for_none_provider() {
        let creds = Credentials {
            provider: "none".to_string(),
            ..Default::default()
        };
        assert!(creds.validate().is_ok());

        let creds = Credentials::default();
        assert!(creds.validate().is_ok());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let creds = Credentials {
            client_secret: "super-secret".to_string(),
            ..Default::default()
        };
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_custom_jwt_builds_like_body() {
        assert!(AuthMethod::CustomJwt.credentials_in_body());
        assert!(AuthMethod::Body.credentials_in_body());
        assert!(!AuthMethod::Basic.credentials_in_body());
    }
}
