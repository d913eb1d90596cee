//! Configuration Boundary Types
//!
//! Closed request/response variants for the UI front end. Payloads are
//! validated here before they reach the core; the UI only ever sees one of
//! these shapes come back.

use serde::{Deserialize, Serialize};

use crate::types::{Credentials, Environment};

/// One operation the configuration UI can ask for.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ConfigRequest {
    /// Upsert an environment after validating its credentials.
    SaveCredentials {
        name: String,
        credentials: Credentials,
    },
    /// Probe the given credentials with a one-shot token request.
    TestCredentials { credentials: Credentials },
    /// List environments plus the current selection.
    LoadEnvironments,
    /// Delete an environment; cascades to its cached tokens.
    DeleteEnvironment { name: String },
}

/// Outcome rendered by the UI for a [`ConfigRequest`].
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ConfigResponse {
    Saved {
        name: String,
    },
    TestResult {
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Environments {
        environments: Vec<Environment>,
        #[serde(skip_serializing_if = "Option::is_none")]
        current: Option<String>,
    },
    Deleted {
        name: String,
        removed: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_credentials_round_trip() {
        let json = r#"{
            "type": "saveCredentials",
            "name": "dev",
            "credentials": {
                "provider": "auth0",
                "token_endpoint": "https://dev.auth0.com/oauth/token",
                "client_id": "id",
                "client_secret": "secret"
            }
        }"#;

        let request: ConfigRequest = serde_json::from_str(json).unwrap();
        match request {
            ConfigRequest::SaveCredentials { name, credentials } => {
                assert_eq!(name, "dev");
                assert_eq!(credentials.client_id, "id");
            }
            other => panic!("unexpected request: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_request_type_rejected() {
        let json = r#"{"type": "dropAllTokens"}"#;
        assert!(serde_json::from_str::<ConfigRequest>(json).is_err());
    }

    #[test]
    fn test_load_environments_tag_only() {
        let request: ConfigRequest =
            serde_json::from_str(r#"{"type": "loadEnvironments"}"#).unwrap();
        assert!(matches!(request, ConfigRequest::LoadEnvironments));
    }
}
