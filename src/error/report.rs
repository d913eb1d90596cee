//! Failure Reports
//!
//! Turns a failed acquisition into one human-readable message: what
//! happened, status-specific remediation hints, and the request diagnostics
//! the user needs to debug their configuration. Hints are advisory only.

use std::fmt::Write;

use crate::error::{NetworkError, ProviderRejection, TokenError};
use crate::types::{AuthMethod, ContentType};

/// Diagnostics describing the request that failed.
#[derive(Clone, Debug)]
pub struct RequestSummary {
    pub endpoint: String,
    pub auth_method: AuthMethod,
    pub content_type: ContentType,
    /// Effective audience for the request, if any.
    pub audience: Option<String>,
}

impl RequestSummary {
    /// Summarize a request built from these credentials.
    pub fn from_credentials(
        credentials: &crate::types::Credentials,
        audience_override: Option<&str>,
    ) -> Self {
        Self {
            endpoint: credentials.token_endpoint.clone(),
            auth_method: credentials.auth_method,
            content_type: credentials.content_type,
            audience: audience_override
                .map(str::to_string)
                .or_else(|| credentials.audience.clone())
                .filter(|audience| !audience.is_empty()),
        }
    }
}

/// Build the single failure message surfaced to the user.
pub fn failure_report(error: &TokenError, request: &RequestSummary) -> String {
    let mut out = primary_line(error);

    let hints = remediation_hints(error);
    if !hints.is_empty() {
        out.push_str("\n\nPossible causes:");
        for hint in hints {
            let _ = write!(out, "\n  - {}", hint);
        }
    }

    out.push_str("\n\nRequest details:");
    let _ = write!(out, "\n  endpoint: {}", request.endpoint);
    let _ = write!(out, "\n  auth method: {}", request.auth_method.as_str());
    let _ = write!(out, "\n  content type: {}", request.content_type.as_str());
    if let Some(audience) = request.audience.as_deref().filter(|a| !a.is_empty()) {
        let _ = write!(out, "\n  audience: {}", audience);
    }

    out
}

fn primary_line(error: &TokenError) -> String {
    match error {
        TokenError::Provider(rejection) => provider_line(rejection),
        TokenError::Network(NetworkError::DnsResolutionFailed { host }) => format!(
            "Cannot reach the authorization server ({}): the hostname did not resolve",
            host
        ),
        other => format!("Token request failed: {}", other),
    }
}

fn provider_line(rejection: &ProviderRejection) -> String {
    let mut line = format!("Token request failed (HTTP {})", rejection.status);

    if let Some(code) = rejection.error.as_deref() {
        let _ = write!(line, ": {}", code);
    }

    let description = rejection
        .error_description
        .as_deref()
        .or(rejection.message.as_deref());
    if let Some(description) = description {
        if rejection.error.is_some() {
            let _ = write!(line, " - {}", description);
        } else {
            let _ = write!(line, ": {}", description);
        }
    }

    line
}

fn remediation_hints(error: &TokenError) -> Vec<&'static str> {
    match error {
        TokenError::Provider(rejection) => match rejection.status {
            401 => vec![
                "Check that the client ID and client secret are correct",
                "Verify any ${VAR} placeholders used by the credentials are set",
                "Confirm the authentication method matches what the provider expects",
                "Check whether the client secret has expired or been rotated",
            ],
            403 => vec![
                "Check the application's permissions for the requested audience",
                "Verify the audience value identifies an API this client may access",
                "Confirm the application is enabled for the client-credentials grant",
            ],
            404 => vec![
                "Check the token endpoint URL for typos",
                "Verify the endpoint path matches the provider's token URL (e.g. /oauth/token)",
            ],
            _ => Vec::new(),
        },
        TokenError::Network(NetworkError::DnsResolutionFailed { .. }) => vec![
            "Check your network connection",
            "If the provider is on an internal network, connect to the VPN",
            "Verify the endpoint hostname is spelled correctly",
        ],
        _ => Vec::new(),
    }
}
