//! HTTP Transport
//!
//! Thin POST-only client interface so the token flow can be exercised
//! against a mock in tests. Token acquisition never issues any other method.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::error::{NetworkError, ProtocolError, TokenError};

/// Default request timeout. A hung token endpoint would otherwise block
/// the calling operation indefinitely.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Outbound token request.
#[derive(Clone, Debug)]
pub struct HttpRequest {
    pub url: String,
    /// Header names are lowercased by the request builder.
    pub headers: HashMap<String, String>,
    pub body: String,
    pub timeout: Option<Duration>,
}

/// Response from the token endpoint.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP transport interface (for dependency injection).
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// POST the request and await the full response.
    async fn post(&self, request: HttpRequest) -> Result<HttpResponse, TokenError>;
}

/// Default reqwest-based transport.
pub struct ReqwestHttpTransport {
    client: reqwest::Client,
    default_timeout: Duration,
}

impl ReqwestHttpTransport {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            // Token endpoints must answer directly; a redirect is a
            // misconfigured endpoint, not something to follow.
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap_or_default();

        Self {
            client,
            default_timeout: timeout,
        }
    }
}

impl Default for ReqwestHttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for ReqwestHttpTransport {
    async fn post(&self, request: HttpRequest) -> Result<HttpResponse, TokenError> {
        let timeout = request.timeout.unwrap_or(self.default_timeout);

        let mut builder = self.client.post(&request.url).timeout(timeout);
        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }
        builder = builder.body(request.body);

        let response = builder
            .send()
            .await
            .map_err(|e| classify_send_error(&e, &request.url, timeout))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            TokenError::Protocol(ProtocolError::InvalidResponse {
                message: e.to_string(),
            })
        })?;

        Ok(HttpResponse { status, body })
    }
}

fn classify_send_error(error: &reqwest::Error, url: &str, timeout: Duration) -> TokenError {
    if error.is_timeout() {
        return TokenError::Network(NetworkError::Timeout { timeout });
    }

    if error.is_connect() && mentions_dns(error) {
        let host = url::Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| url.to_string());
        return TokenError::Network(NetworkError::DnsResolutionFailed { host });
    }

    TokenError::Network(NetworkError::ConnectionFailed {
        message: error.to_string(),
    })
}

// reqwest does not expose a typed DNS failure; the resolver error only shows
// up in the source chain.
fn mentions_dns(error: &(dyn std::error::Error + 'static)) -> bool {
    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(error);
    while let Some(err) = current {
        let text = err.to_string().to_lowercase();
        if text.contains("dns") || text.contains("failed to lookup") {
            return true;
        }
        current = err.source();
    }
    false
}

/// Mock transport for testing.
#[derive(Default)]
pub struct MockHttpTransport {
    queue: Mutex<Vec<Result<HttpResponse, TokenError>>>,
    request_history: Mutex<Vec<HttpRequest>>,
}

impl MockHttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response to return (FIFO).
    pub fn queue_response(&self, response: HttpResponse) -> &Self {
        self.queue.lock().unwrap().push(Ok(response));
        self
    }

    /// Queue a JSON response.
    pub fn queue_json_response<T: serde::Serialize>(&self, status: u16, body: &T) -> &Self {
        self.queue_response(HttpResponse {
            status,
            body: serde_json::to_string(body).unwrap(),
        })
    }

    /// Queue a transport-level failure.
    pub fn queue_error(&self, error: TokenError) -> &Self {
        self.queue.lock().unwrap().push(Err(error));
        self
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.request_history.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.request_history.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl HttpTransport for MockHttpTransport {
    async fn post(&self, request: HttpRequest) -> Result<HttpResponse, TokenError> {
        self.request_history.lock().unwrap().push(request);

        let mut queue = self.queue.lock().unwrap();
        if queue.is_empty() {
            return Err(TokenError::Network(NetworkError::ConnectionFailed {
                message: "no mock response queued".to_string(),
            }));
        }
        queue.remove(0)
    }
}
