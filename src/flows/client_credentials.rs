//! Client Credentials Flow
//!
//! RFC 6749 Section 4.4 - Client Credentials Grant. Builds the
//! provider-agnostic token request (headers and body per the configured auth
//! method and content type) and issues the single POST. No retries; a failed
//! attempt is terminal until the caller triggers another.

use async_trait::async_trait;
use base64::Engine;
use secrecy::ExposeSecret;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use crate::core::{HttpRequest, HttpTransport};
use crate::error::{provider_rejection, ConfigError, ProtocolError, TokenError, TokenResult};
use crate::types::{AuthMethod, ContentType, ResolvedCredentials, TokenResponse};

/// A fully computed token request, ready for transport.
#[derive(Clone, Debug)]
pub struct TokenRequest {
    pub endpoint: String,
    /// Lowercased header names; custom headers already overlaid.
    pub headers: HashMap<String, String>,
    pub body: String,
}

/// Build the POST for a resolved credentials record.
///
/// Audience/scope overrides take precedence over the stored defaults. An
/// explicitly empty scope override is honored as an empty scope; an empty
/// audience is treated as absent and omitted from the body.
pub fn build_token_request(
    credentials: &ResolvedCredentials,
    audience_override: Option<&str>,
    scope_override: Option<&str>,
) -> Result<TokenRequest, TokenError> {
    let endpoint = credentials.token_endpoint.trim();
    if endpoint.is_empty() {
        return Err(ConfigError::MissingField {
            field: "token_endpoint".to_string(),
        }
        .into());
    }
    if url::Url::parse(endpoint).is_err() {
        return Err(ConfigError::InvalidEndpoint {
            url: endpoint.to_string(),
        }
        .into());
    }

    let mut headers = HashMap::new();
    headers.insert(
        "content-type".to_string(),
        credentials.content_type.as_str().to_string(),
    );

    if credentials.auth_method == AuthMethod::Basic {
        let pair = format!(
            "{}:{}",
            credentials.client_id,
            credentials.client_secret.expose_secret()
        );
        let encoded = base64::engine::general_purpose::STANDARD.encode(pair);
        headers.insert("authorization".to_string(), format!("Basic {}", encoded));
    }

    // Custom headers go on after the built-ins; a colliding key overwrites.
    for (key, value) in &credentials.custom_headers {
        headers.insert(key.to_lowercase(), value.clone());
    }

    let fields = body_fields(credentials, audience_override, scope_override);
    let body = match credentials.content_type {
        ContentType::Json => encode_json(&fields),
        ContentType::FormUrlencoded => encode_form(&fields),
    };

    Ok(TokenRequest {
        endpoint: endpoint.to_string(),
        headers,
        body,
    })
}

fn body_fields(
    credentials: &ResolvedCredentials,
    audience_override: Option<&str>,
    scope_override: Option<&str>,
) -> Vec<(String, String)> {
    // A caller with custom body fields opted into a fully custom payload;
    // the standard OAuth fields are not merged in.
    if !credentials.custom_body.is_empty() {
        return credentials.custom_body.clone();
    }

    let audience = audience_override
        .map(str::to_string)
        .or_else(|| credentials.audience.clone())
        .filter(|a| !a.is_empty());
    let scope = scope_override
        .map(str::to_string)
        .or_else(|| credentials.scope.clone())
        .unwrap_or_default();

    let mut fields = Vec::new();
    if credentials.auth_method.credentials_in_body() {
        fields.push(("client_id".to_string(), credentials.client_id.clone()));
        fields.push((
            "client_secret".to_string(),
            credentials.client_secret.expose_secret().to_string(),
        ));
        if let Some(audience) = audience {
            fields.push(("audience".to_string(), audience));
        }
        fields.push(("grant_type".to_string(), "client_credentials".to_string()));
        fields.push(("scope".to_string(), scope));
    } else {
        // Basic: credentials travel in the Authorization header only.
        fields.push(("grant_type".to_string(), "client_credentials".to_string()));
        fields.push(("scope".to_string(), scope));
        if let Some(audience) = audience {
            fields.push(("audience".to_string(), audience));
        }
    }

    fields
}

fn encode_json(fields: &[(String, String)]) -> String {
    let mut map = serde_json::Map::new();
    for (key, value) in fields {
        map.insert(key.clone(), serde_json::Value::String(value.clone()));
    }
    serde_json::Value::Object(map).to_string()
}

fn encode_form(fields: &[(String, String)]) -> String {
    fields
        .iter()
        .map(|(key, value)| {
            format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Token acquisition flow interface.
#[async_trait]
pub trait TokenFlow: Send + Sync {
    /// Request an access token for the given resolved credentials.
    async fn request_token(
        &self,
        credentials: &ResolvedCredentials,
        audience: Option<&str>,
        scope: Option<&str>,
    ) -> TokenResult<TokenResponse>;
}

/// Client credentials flow over an [`HttpTransport`].
pub struct ClientCredentialsFlow<T: HttpTransport> {
    transport: Arc<T>,
    timeout: Option<Duration>,
}

impl<T: HttpTransport> ClientCredentialsFlow<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self {
            transport,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[async_trait]
impl<T: HttpTransport> TokenFlow for ClientCredentialsFlow<T> {
    async fn request_token(
        &self,
        credentials: &ResolvedCredentials,
        audience: Option<&str>,
        scope: Option<&str>,
    ) -> TokenResult<TokenResponse> {
        let request = build_token_request(credentials, audience, scope)?;

        tracing::debug!(
            endpoint = %request.endpoint,
            auth_method = credentials.auth_method.as_str(),
            "requesting token"
        );

        let response = self
            .transport
            .post(HttpRequest {
                url: request.endpoint,
                headers: request.headers,
                body: request.body,
                timeout: self.timeout,
            })
            .await?;

        if !response.is_success() {
            return Err(provider_rejection(response.status, &response.body).into());
        }

        let token: TokenResponse = serde_json::from_str(&response.body).map_err(|e| {
            TokenError::Protocol(ProtocolError::InvalidJson {
                message: e.to_string(),
            })
        })?;

        tracing::info!(expires_in = token.expires_in, "token issued");
        Ok(token)
    }
}

/// Mock flow for testing orchestration without a transport.
#[derive(Default)]
pub struct MockTokenFlow {
    queue: Mutex<Vec<TokenResult<TokenResponse>>>,
    request_history: Mutex<Vec<(Option<String>, Option<String>)>>,
}

impl MockTokenFlow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a token response to return (FIFO).
    pub fn queue_token(&self, response: TokenResponse) -> &Self {
        self.queue.lock().unwrap().push(Ok(response));
        self
    }

    /// Queue an error to return.
    pub fn queue_error(&self, error: TokenError) -> &Self {
        self.queue.lock().unwrap().push(Err(error));
        self
    }

    /// (audience, scope) pairs of the requests seen so far.
    pub fn request_history(&self) -> Vec<(Option<String>, Option<String>)> {
        self.request_history.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.request_history.lock().unwrap().len()
    }
}

#[async_trait]
impl TokenFlow for MockTokenFlow {
    async fn request_token(
        &self,
        _credentials: &ResolvedCredentials,
        audience: Option<&str>,
        scope: Option<&str>,
    ) -> TokenResult<TokenResponse> {
        self.request_history
            .lock()
            .unwrap()
            .push((audience.map(str::to_string), scope.map(str::to_string)));

        let mut queue = self.queue.lock().unwrap();
        if queue.is_empty() {
            return Ok(TokenResponse {
                access_token: "mock-client-credentials-token".to_string(),
                expires_in: 3600,
                token_type: "Bearer".to_string(),
                scope: None,
            });
        }
        queue.remove(0)
    }
}
