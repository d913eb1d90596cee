//! Placeholder Resolution
//!
//! Expands `${VAR}` references in credential fields against a variable
//! lookup (the process environment in production). Unresolved names are left
//! as the literal placeholder text and reported, never treated as fatal.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use secrecy::SecretString;

use crate::types::{Credentials, ResolvedCredentials};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern"));

/// Result of resolving one string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub value: String,
    /// Names that were unset or empty; the literal `${NAME}` stays in place.
    pub missing: Vec<String>,
}

/// Resolve placeholders with an injected lookup.
///
/// Each occurrence resolves independently; input with no placeholders is
/// returned unchanged.
pub fn resolve_with<F>(input: &str, lookup: F) -> Resolution
where
    F: Fn(&str) -> Option<String>,
{
    let mut missing = Vec::new();
    let value = PLACEHOLDER
        .replace_all(input, |caps: &Captures<'_>| {
            let name = &caps[1];
            match lookup(name) {
                Some(value) if !value.is_empty() => value,
                _ => {
                    missing.push(name.to_string());
                    caps[0].to_string()
                }
            }
        })
        .into_owned();

    Resolution { value, missing }
}

/// Resolve placeholders against the process environment.
pub fn resolve(input: &str) -> Resolution {
    resolve_with(input, env_lookup)
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Resolve every placeholder-bearing field of a credentials record.
///
/// Applies to the token endpoint, client id, client secret, audience, scope,
/// and every custom header/body value. Emits one warning listing all
/// unresolved names for the call; the list is also returned for callers that
/// surface it.
pub fn resolve_credentials_with<F>(
    credentials: &Credentials,
    lookup: F,
) -> (ResolvedCredentials, Vec<String>)
where
    F: Fn(&str) -> Option<String>,
{
    let mut missing: Vec<String> = Vec::new();
    let mut grab = |input: &str| -> String {
        let resolution = resolve_with(input, &lookup);
        missing.extend(resolution.missing);
        resolution.value
    };

    let token_endpoint = grab(&credentials.token_endpoint);
    let client_id = grab(&credentials.client_id);
    let client_secret = grab(&credentials.client_secret);
    let audience = credentials.audience.as_deref().map(&mut grab);
    let scope = credentials.scope.as_deref().map(&mut grab);
    let custom_headers = credentials
        .custom_headers
        .iter()
        .map(|field| (field.key.clone(), grab(&field.value)))
        .collect();
    let custom_body = credentials
        .custom_body
        .iter()
        .map(|field| (field.key.clone(), grab(&field.value)))
        .collect();

    if !missing.is_empty() {
        missing.sort();
        missing.dedup();
        tracing::warn!(
            unresolved = %missing.join(", "),
            "placeholder variables are unset; literal ${{NAME}} text was kept"
        );
    }

    let resolved = ResolvedCredentials {
        provider: credentials.provider.clone(),
        token_endpoint,
        client_id,
        client_secret: SecretString::new(client_secret),
        audience,
        scope,
        auth_method: credentials.auth_method,
        content_type: credentials.content_type,
        custom_headers,
        custom_body,
    };

    (resolved, missing)
}

/// Resolve a credentials record against the process environment.
pub fn resolve_credentials(credentials: &Credentials) -> (ResolvedCredentials, Vec<String>) {
    resolve_credentials_with(credentials, env_lookup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CustomField;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_no_placeholders_is_identity() {
        let resolution = resolve_with("https://example.com/token", lookup_from(&[]));
        assert_eq!(resolution.value, "https://example.com/token");
        assert!(resolution.missing.is_empty());
    }

    #[test]
    fn test_multiple_placeholders_resolved_independently() {
        let resolution = resolve_with("${A}-${B}", lookup_from(&[("A", "1"), ("B", "2")]));
        assert_eq!(resolution.value, "1-2");
        assert!(resolution.missing.is_empty());
    }

    #[test]
    fn test_missing_variable_keeps_literal_and_records_name() {
        let resolution = resolve_with("${MISSING}", lookup_from(&[]));
        assert_eq!(resolution.value, "${MISSING}");
        assert_eq!(resolution.missing, vec!["MISSING".to_string()]);
    }

    #[test]
    fn test_empty_variable_counts_as_missing() {
        let resolution = resolve_with("${EMPTY}", lookup_from(&[("EMPTY", "")]));
        assert_eq!(resolution.value, "${EMPTY}");
        assert_eq!(resolution.missing, vec!["EMPTY".to_string()]);
    }

    #[test]
    fn test_mixed_resolution() {
        let resolution = resolve_with(
            "id-${SET}-${UNSET}",
            lookup_from(&[("SET", "ok")]),
        );
        assert_eq!(resolution.value, "id-ok-${UNSET}");
        assert_eq!(resolution.missing, vec!["UNSET".to_string()]);
    }

    #[test]
    fn test_resolve_credentials_covers_all_fields() {
        let credentials = Credentials {
            token_endpoint: "https://${TENANT}.auth0.com/oauth/token".to_string(),
            client_id: "${CLIENT_ID}".to_string(),
            client_secret: "${CLIENT_SECRET}".to_string(),
            audience: Some("${AUDIENCE}".to_string()),
            scope: Some("read ${EXTRA_SCOPE}".to_string()),
            custom_headers: vec![CustomField::new("x-tenant", "${TENANT}")],
            custom_body: vec![CustomField::new("tenant", "${TENANT}")],
            ..Default::default()
        };

        let lookup = lookup_from(&[
            ("TENANT", "dev"),
            ("CLIENT_ID", "abc"),
            ("CLIENT_SECRET", "shh"),
            ("AUDIENCE", "https://api.x.com"),
        ]);

        let (resolved, missing) = resolve_credentials_with(&credentials, lookup);
        assert_eq!(resolved.token_endpoint, "https://dev.auth0.com/oauth/token");
        assert_eq!(resolved.client_id, "abc");
        assert_eq!(resolved.client_secret.expose_secret(), "shh");
        assert_eq!(resolved.audience.as_deref(), Some("https://api.x.com"));
        assert_eq!(resolved.scope.as_deref(), Some("read ${EXTRA_SCOPE}"));
        assert_eq!(resolved.custom_headers[0].1, "dev");
        assert_eq!(resolved.custom_body[0].1, "dev");
        assert_eq!(missing, vec!["EXTRA_SCOPE".to_string()]);
    }
}
