//! Credentials Builder
//!
//! Fluent construction of a validated, normalized credentials record.

use crate::error::TokenError;
use crate::types::{AuthMethod, ContentType, Credentials, CustomField};

/// Builder for [`Credentials`].
#[derive(Default)]
pub struct CredentialsBuilder {
    provider: String,
    token_endpoint: String,
    client_id: String,
    client_secret: String,
    audience: Option<String>,
    scope: Option<String>,
    auth_method: AuthMethod,
    content_type: ContentType,
    custom_headers: Vec<CustomField>,
    custom_body: Vec<CustomField>,
}

impl CredentialsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the provider label ("auth0", "okta", "azure-ad", "none", ...).
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    pub fn token_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.token_endpoint = endpoint.into();
        self
    }

    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    pub fn client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = client_secret.into();
        self
    }

    pub fn audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn auth_method(mut self, method: AuthMethod) -> Self {
        self.auth_method = method;
        self
    }

    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }

    /// Append a custom header (order preserved).
    pub fn custom_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.push(CustomField::new(key, value));
        self
    }

    /// Append a custom body field (order preserved; non-empty custom body
    /// replaces the standard OAuth fields entirely).
    pub fn custom_body_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_body.push(CustomField::new(key, value));
        self
    }

    /// Normalize and validate the record.
    pub fn build(self) -> Result<Credentials, TokenError> {
        let credentials = Credentials {
            provider: self.provider,
            token_endpoint: self.token_endpoint,
            client_id: self.client_id,
            client_secret: self.client_secret,
            audience: self.audience,
            scope: self.scope,
            auth_method: self.auth_method,
            content_type: self.content_type,
            custom_headers: self.custom_headers,
            custom_body: self.custom_body,
        }
        .normalized();

        credentials.validate()?;
        Ok(credentials)
    }
}

/// Create a new credentials builder.
pub fn credentials() -> CredentialsBuilder {
    CredentialsBuilder::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_success() {
        let credentials = credentials()
            .provider("auth0")
            .token_endpoint(" https://dev.auth0.com/oauth/token ")
            .client_id("client-123")
            .client_secret("secret")
            .audience("https://api.x.com")
            .auth_method(AuthMethod::Basic)
            .content_type(ContentType::FormUrlencoded)
            .custom_header("x-tenant", "dev")
            .build()
            .unwrap();

        assert_eq!(credentials.token_endpoint, "https://dev.auth0.com/oauth/token");
        assert_eq!(credentials.auth_method, AuthMethod::Basic);
        assert_eq!(credentials.custom_headers.len(), 1);
    }

    #[test]
    fn test_builder_missing_secret_for_named_provider() {
        let result = credentials()
            .provider("okta")
            .token_endpoint("https://example.okta.com/oauth2/v1/token")
            .client_id("client-123")
            .build();

        assert!(result.is_err());
    }

    #[test]
    fn test_builder_none_provider_relaxes_required_fields() {
        let credentials = credentials().provider("none").build().unwrap();
        assert!(credentials.token_endpoint.is_empty());
    }
}
